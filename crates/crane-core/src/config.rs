use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `~/.crane/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Local store settings from `[store]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store root; `~` expands to the home directory. Defaults to `<crane home>/store`.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Resolver settings from `[resolver]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default, rename = "conflict-policy")]
    pub conflict_policy: ConflictPolicy,
}

/// What to do when two requests for one package resolve to different references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The request nearest to the root wins (first declared on ties) and the
    /// override is reported.
    #[default]
    NearestWins,
    /// Any mismatch fails the resolution.
    Strict,
}

impl GlobalConfig {
    /// Load the global configuration from `<crane home>/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load a configuration file, returning defaults when it is missing.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                crane_util::errors::CraneError::Generic {
                    message: format!("Failed to read global config: {e}"),
                }
            })?;
            toml::from_str(&content).map_err(|e| {
                crane_util::errors::CraneError::Generic {
                    message: format!("Failed to parse global config: {e}"),
                }
                .into()
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// The configured store root.
    pub fn store_dir(&self) -> PathBuf {
        match self.store.dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => dirs_path().join("store"),
        }
    }
}

/// Returns the Crane data directory: `$CRANE_HOME`, else `~/.crane/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(home) = std::env::var("CRANE_HOME") {
        if !home.is_empty() {
            return PathBuf::from(home);
        }
    }
    home_dir().join(".crane")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if dir == "~" => home_dir(),
        None => PathBuf::from(dir),
    }
}
