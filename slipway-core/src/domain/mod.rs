//! Core domain types
//!
//! These types mirror the resources exposed by the generation worker. The
//! client only ever holds read snapshots of them; the worker owns their state.

pub mod health;
pub mod job;
pub mod storage;
pub mod theme;
pub mod worker;
