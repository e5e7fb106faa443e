//! Dependency resolution engine: alias store, range and alias resolution,
//! nearest-wins version selection, graph building, option propagation and
//! graph export.

pub mod alias;
pub mod catalog;
pub mod conflict;
pub mod events;
pub mod export;
pub mod graph;
pub mod options;
pub mod path;
pub mod provider;
pub mod resolver;
pub mod version;
