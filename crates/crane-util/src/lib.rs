//! Shared utilities for the Crane package manager.
//!
//! This crate provides cross-cutting concerns used by all other Crane crates:
//! the unified error type and filesystem helpers.

pub mod errors;
pub mod fs;
