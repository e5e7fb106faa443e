//! The `aliases.toml` file.
//!
//! ```toml
//! [[alias]]
//! source = "Pkg/latest@user/testing"
//! target = "Pkg/0.1@user/testing"
//! ```

use std::path::Path;

use crane_resolver::alias::{AliasEntry, AliasStore};
use crane_util::errors::{CraneError, CraneResult};
use crane_util::fs::write_atomic;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default, rename = "alias")]
    aliases: Vec<AliasEntry>,
}

/// Load an alias table. A missing file is an empty table.
pub fn load(path: &Path) -> CraneResult<AliasStore> {
    if !path.is_file() {
        return Ok(AliasStore::new());
    }
    let content = std::fs::read_to_string(path)?;
    let file: AliasFile = toml::from_str(&content).map_err(|e| CraneError::Manifest {
        message: format!("Failed to parse {}: {e}", path.display()),
    })?;
    tracing::debug!(path = %path.display(), count = file.aliases.len(), "loaded aliases");
    Ok(AliasStore::from_entries(file.aliases))
}

/// Write the whole alias table, replacing the file atomically.
pub fn save(path: &Path, store: &AliasStore) -> CraneResult<()> {
    let file = AliasFile {
        aliases: store.entries(),
    };
    let content = toml::to_string_pretty(&file).map_err(|e| CraneError::Generic {
        message: format!("Failed to serialize aliases: {e}"),
    })?;
    write_atomic(path, content.as_bytes())?;
    Ok(())
}
