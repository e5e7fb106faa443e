//! Handler for `crane info`.

use std::path::{Path, PathBuf};

use miette::Result;

use crane_core::config::{ConflictPolicy, GlobalConfig};
use crane_ops::ops_info::{self, InfoOptions};
use crane_store::local::LocalStore;

#[allow(clippy::too_many_arguments)]
pub fn exec(
    store: &LocalStore,
    config: &GlobalConfig,
    path: Option<&Path>,
    graph: Option<PathBuf>,
    json: bool,
    strict: bool,
    depth: Option<u32>,
    why: Option<String>,
    inverted: Option<String>,
) -> Result<()> {
    let cwd = std::env::current_dir().map_err(crane_util::errors::CraneError::Io)?;
    let manifest_path = ops_info::locate_manifest(path, &cwd)?;

    let policy = if strict {
        ConflictPolicy::Strict
    } else {
        config.resolver.conflict_policy
    };
    let opts = InfoOptions {
        graph,
        json,
        policy,
        depth: depth.map(|d| d as usize),
        why,
        inverted,
    };

    ops_info::info(store, &manifest_path, &opts)
}
