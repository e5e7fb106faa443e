//! Override reporting.
//!
//! An override is a non-fatal notice: a request was collapsed onto another
//! version, or an option value lost against one declared nearer the root.

use std::fmt;

/// What was overridden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideKind {
    /// A request for `requested` was served by `selected`.
    Version { requested: String, selected: String },
    /// An option override lost against another declared value.
    Option {
        option: String,
        requested: String,
        selected: String,
    },
}

/// A single reported override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// Package name the override applies to.
    pub package: String,
    /// Who declared the losing request (a reference or the root's display name).
    pub consumer: String,
    pub kind: OverrideKind,
}

/// All overrides encountered during one resolution pass, in discovery order.
#[derive(Debug, Default, Clone)]
pub struct OverrideReport {
    pub overrides: Vec<Override>,
}

impl OverrideReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Override) {
        tracing::warn!("{item}");
        self.overrides.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }
}

impl fmt::Display for OverrideReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overrides.is_empty() {
            return write!(f, "No overrides.");
        }
        writeln!(f, "Overrides ({}):", self.overrides.len())?;
        for o in &self.overrides {
            writeln!(f, "  {o}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OverrideKind::Version {
                requested,
                selected,
            } => write!(
                f,
                "{}: requirement {} overridden by {} to {}",
                self.consumer, requested, self.package, selected
            ),
            OverrideKind::Option {
                option,
                requested,
                selected,
            } => write!(
                f,
                "{}: option {}:{}={} overridden to {}",
                self.consumer, self.package, option, requested, selected
            ),
        }
    }
}
