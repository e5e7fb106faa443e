//! Core data types for the Crane package manager.
//!
//! This crate defines the values the resolver works on: package references
//! (`name/version@user/channel`), recipe declarations, the consumer manifest
//! (`Crane.toml`) and the global configuration.
//!
//! This crate is intentionally free of resolution logic and of store I/O.

/// File name of the consumer manifest looked up by the CLI.
pub const MANIFEST_FILE: &str = "Crane.toml";

/// File name of a recipe inside the local store.
pub const RECIPE_FILE: &str = "recipe.toml";

pub mod config;
pub mod manifest;
pub mod recipe;
pub mod reference;
