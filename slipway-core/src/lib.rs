//! Slipway Core
//!
//! Core types shared by the Slipway client, generator and CLI.
//!
//! This crate contains:
//! - Domain types: entities owned by the remote generation worker (Job, themes, workspaces)
//! - DTOs: query and request bodies sent to the worker API

pub mod domain;
pub mod dto;
