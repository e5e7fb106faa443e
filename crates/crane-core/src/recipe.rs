//! Recipe declarations: what a package requires and which options it exposes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crane_util::errors::{CraneError, CraneResult};
use serde::{Deserialize, Serialize};

use crate::reference::Reference;

/// Category of a requirement edge.
///
/// Build requirements are resolved before regular requirements but end up in
/// the same graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementKind {
    Build,
    Regular,
}

impl RequirementKind {
    /// Resolution order of the phases.
    pub const ORDER: [RequirementKind; 2] = [RequirementKind::Build, RequirementKind::Regular];
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementKind::Build => f.write_str("build"),
            RequirementKind::Regular => f.write_str("regular"),
        }
    }
}

/// An option value a consumer forces onto a package further down the graph,
/// declared as `"Pkg:option" = "value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOverride {
    pub package: String,
    pub option: String,
    pub value: String,
}

impl OptionOverride {
    /// Split a `Pkg:option` key. Returns `None` for plain option names.
    pub fn from_entry(key: &str, value: &str) -> Option<Self> {
        let (package, option) = key.split_once(':')?;
        Some(Self {
            package: package.trim().to_string(),
            option: option.trim().to_string(),
            value: value.to_string(),
        })
    }
}

/// A static recipe declaration, stored as `recipe.toml`.
///
/// ```toml
/// description = "compression library"
/// requires = ["LibC/[~0.1]@user/testing"]
/// build_requires = ["Tool/1.0@user/testing"]
///
/// [options]
/// shared = ["True", "False"]
///
/// [default_options]
/// shared = "False"
/// "LibD:myoption" = "False"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(default)]
    pub build_requires: Vec<String>,

    /// Declared options and their allowed values. An empty list accepts any value.
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,

    /// Own option defaults plus `Pkg:option` overrides for dependencies.
    #[serde(default)]
    pub default_options: BTreeMap<String, String>,
}

impl Recipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_require(mut self, reference: &str) -> Self {
        self.requires.push(reference.to_string());
        self
    }

    pub fn with_build_require(mut self, reference: &str) -> Self {
        self.build_requires.push(reference.to_string());
        self
    }

    /// Declare an option with its allowed values and default.
    pub fn with_option(mut self, name: &str, allowed: &[&str], default: &str) -> Self {
        self.options.insert(
            name.to_string(),
            allowed.iter().map(|v| v.to_string()).collect(),
        );
        self.default_options
            .insert(name.to_string(), default.to_string());
        self
    }

    /// Force an option value on a dependency (`"Pkg:option" = "value"`).
    pub fn with_downstream_option(mut self, package: &str, option: &str, value: &str) -> Self {
        self.default_options
            .insert(format!("{package}:{option}"), value.to_string());
        self
    }

    /// Load and parse a recipe file.
    pub fn from_path(path: &Path) -> CraneResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CraneError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a recipe from TOML text.
    pub fn from_toml(content: &str) -> CraneResult<Self> {
        toml::from_str(content).map_err(|e| CraneError::Manifest {
            message: format!("Failed to parse recipe: {e}"),
        })
    }

    /// Serialize the recipe to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Parsed requirement references for one phase, in declaration order.
    pub fn requirements(&self, kind: RequirementKind) -> CraneResult<Vec<Reference>> {
        let declared = match kind {
            RequirementKind::Build => &self.build_requires,
            RequirementKind::Regular => &self.requires,
        };
        declared.iter().map(|r| Reference::parse(r)).collect()
    }

    /// The recipe's own option defaults (entries without a `Pkg:` prefix).
    pub fn own_defaults(&self) -> BTreeMap<String, String> {
        self.default_options
            .iter()
            .filter(|(k, _)| !k.contains(':'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Option overrides this recipe forces on its dependencies.
    pub fn downstream_options(&self) -> Vec<OptionOverride> {
        self.default_options
            .iter()
            .filter_map(|(k, v)| OptionOverride::from_entry(k, v))
            .collect()
    }

    /// Check that `value` is acceptable for option `name`.
    pub fn validate_option(&self, name: &str, value: &str) -> Result<(), String> {
        match self.options.get(name) {
            None => Err(format!("option '{name}' doesn't exist")),
            Some(allowed) if allowed.is_empty() || allowed.iter().any(|a| a == value) => Ok(()),
            Some(allowed) => Err(format!(
                "'{value}' is not a valid value for option '{name}'. Possible values are {allowed:?}"
            )),
        }
    }
}
