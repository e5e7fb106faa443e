//! Local package store: exported recipes laid out by reference, plus the
//! persisted alias table.

pub mod aliases;
pub mod local;
