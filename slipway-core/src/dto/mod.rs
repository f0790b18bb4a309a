//! Data Transfer Objects for the worker API
//!
//! Query strings and request bodies sent by the client. Responses are
//! deserialized straight into domain types.

pub mod job;
pub mod theme;
pub mod worker;
