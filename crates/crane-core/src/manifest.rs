use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crane_util::errors::{CraneError, CraneResult};

use crate::recipe::{OptionOverride, RequirementKind};
use crate::reference::Reference;

/// The parsed representation of a consumer `Crane.toml`.
///
/// A manifest is the virtual root of a resolution: it only declares
/// requirements and option overrides, it is never a package itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(default)]
    pub build_requires: Vec<String>,

    /// `"Pkg:option" = "value"` overrides applied downstream.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Manifest {
    /// Load and parse a `Crane.toml` file from the given path.
    pub fn from_path(path: &Path) -> CraneResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CraneError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a `Crane.toml` from a string.
    pub fn from_toml(content: &str) -> CraneResult<Self> {
        toml::from_str(content).map_err(|e| CraneError::Manifest {
            message: format!("Failed to parse Crane.toml: {e}"),
        })
    }

    /// Parsed requirement references for one phase, in declaration order.
    pub fn requirements(&self, kind: RequirementKind) -> CraneResult<Vec<Reference>> {
        let declared = match kind {
            RequirementKind::Build => &self.build_requires,
            RequirementKind::Regular => &self.requires,
        };
        declared.iter().map(|r| Reference::parse(r)).collect()
    }

    /// Option overrides for dependencies. Every key must name a package.
    pub fn option_overrides(&self) -> CraneResult<Vec<OptionOverride>> {
        self.options
            .iter()
            .map(|(key, value)| {
                OptionOverride::from_entry(key, value).ok_or_else(|| CraneError::Manifest {
                    message: format!("option '{key}' must be written as \"Package:option\""),
                })
            })
            .collect()
    }
}
