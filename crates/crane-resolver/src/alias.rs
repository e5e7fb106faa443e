//! The alias store: transparent redirects from one reference to another.
//!
//! An alias `PkgA/latest@user/testing -> PkgA/0.1@user/testing` is followed
//! before any graph node is created, so aliases never show up in a resolved
//! graph. Chains (`megalatest -> superlatest -> latest -> 0.1`) collapse in a
//! single [`AliasSnapshot::resolve`] call.

use std::collections::{BTreeMap, HashSet};
use std::sync::{PoisonError, RwLock};

use crane_core::reference::Reference;
use crane_util::errors::{CraneError, CraneResult};
use serde::{Deserialize, Serialize};

use crate::provider::PackageIndex;

/// One persisted alias entry, as stored in `aliases.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub source: Reference,
    pub target: Reference,
}

/// Process-wide alias mapping.
///
/// Writers take the lock for the duration of one mutation; a resolution pass
/// reads from a [`AliasSnapshot`] taken once at its start, so it never sees a
/// half-updated chain.
#[derive(Debug, Default)]
pub struct AliasStore {
    entries: RwLock<BTreeMap<Reference, Reference>>,
}

impl AliasStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted entries. Later entries win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = AliasEntry>,
    {
        let map = entries
            .into_iter()
            .map(|entry| (entry.source, entry.target))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Define (or redefine) `source` as an alias of `target`.
    ///
    /// Returns the previous target when an alias was overwritten. Fails
    /// without touching the store when the names differ, when either side is a
    /// range, or when `source` is a real package known to `packages`.
    pub fn define(
        &self,
        source: Reference,
        target: Reference,
        packages: &dyn PackageIndex,
    ) -> CraneResult<Option<Reference>> {
        if source.name() != target.name() {
            return Err(CraneError::NameMismatch {
                alias: source.to_string(),
                target: target.to_string(),
            });
        }
        if source.is_range() || target.is_range() {
            return Err(CraneError::InvalidAlias {
                message: format!("'{source}' -> '{target}': aliases cannot use version ranges"),
            });
        }
        if packages.contains_package(&source) {
            return Err(CraneError::AlreadyExistsAsPackage {
                reference: source.to_string(),
            });
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(source.clone(), target.clone());
        match &previous {
            Some(old) => tracing::info!(%source, %target, previous = %old, "alias redefined"),
            None => tracing::info!(%source, %target, "alias defined"),
        }
        Ok(previous)
    }

    /// Follow aliases from `reference` to its terminal reference.
    pub fn resolve(&self, reference: &Reference) -> CraneResult<Reference> {
        self.snapshot().resolve(reference)
    }

    /// Delete an alias. Returns `false` when there was nothing to delete.
    pub fn remove(&self, reference: &Reference) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.remove(reference).is_some();
        if removed {
            tracing::info!(%reference, "alias removed");
        }
        removed
    }

    /// The direct (one hop) target of an alias.
    pub fn target(&self, reference: &Reference) -> Option<Reference> {
        self.read().get(reference).cloned()
    }

    pub fn is_alias(&self, reference: &Reference) -> bool {
        self.read().contains_key(reference)
    }

    /// All entries in reference order, for persistence.
    pub fn entries(&self) -> Vec<AliasEntry> {
        self.read()
            .iter()
            .map(|(source, target)| AliasEntry {
                source: source.clone(),
                target: target.clone(),
            })
            .collect()
    }

    /// A consistent copy of the mapping for one resolution pass.
    pub fn snapshot(&self) -> AliasSnapshot {
        AliasSnapshot {
            entries: self.read().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<Reference, Reference>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Immutable view of the alias mapping.
#[derive(Debug, Clone, Default)]
pub struct AliasSnapshot {
    entries: BTreeMap<Reference, Reference>,
}

impl AliasSnapshot {
    /// Follow aliases to the terminal reference, failing on a cycle.
    pub fn resolve(&self, reference: &Reference) -> CraneResult<Reference> {
        let mut chain = vec![reference.clone()];
        let mut seen = HashSet::from([reference.clone()]);
        let mut current = reference;

        while let Some(next) = self.entries.get(current) {
            chain.push(next.clone());
            if !seen.insert(next.clone()) {
                return Err(CraneError::AliasCycle {
                    chain: render_chain(&chain),
                });
            }
            current = next;
        }

        if chain.len() > 1 {
            tracing::debug!(alias = %reference, target = %current, hops = chain.len() - 1, "alias resolved");
        }
        Ok(current.clone())
    }

    /// Alias sources with the given name, so ranges can match alias versions.
    pub fn sources_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.entries.keys().filter(move |r| r.name() == name)
    }
}

fn render_chain(chain: &[Reference]) -> String {
    chain
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
