//! The local store directory.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crane_core::config::GlobalConfig;
use crane_core::recipe::{Recipe, RequirementKind};
use crane_core::reference::Reference;
use crane_core::RECIPE_FILE;
use crane_resolver::alias::AliasStore;
use crane_resolver::provider::{PackageIndex, RecipeProvider};
use crane_util::errors::{CraneError, CraneResult};
use crane_util::fs::{remove_dir_pruning, write_atomic};

use crate::aliases;

/// Placeholder directory name for a missing user or channel.
const NONE_COMPONENT: &str = "_";

/// How long an alias update waits for another process to release the table.
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_POLL: Duration = Duration::from_millis(20);

/// Recipes and aliases under one root directory.
///
/// Layout: `<root>/<name>/<version>/<user>/<channel>/recipe.toml`, with `_`
/// standing in for a missing user or channel, and `<root>/aliases.toml`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The store configured in the global config.
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(&config.store_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the recipe of a reference.
    pub fn recipe_dir(&self, reference: &Reference) -> PathBuf {
        self.root
            .join(reference.name())
            .join(reference.version())
            .join(reference.user().unwrap_or(NONE_COMPONENT))
            .join(reference.channel().unwrap_or(NONE_COMPONENT))
    }

    fn recipe_path(&self, reference: &Reference) -> PathBuf {
        self.recipe_dir(reference).join(RECIPE_FILE)
    }

    pub fn aliases_path(&self) -> PathBuf {
        self.root.join("aliases.toml")
    }

    pub fn has_recipe(&self, reference: &Reference) -> bool {
        self.recipe_path(reference).is_file()
    }

    /// Read the recipe stored for a reference, if any.
    pub fn get_recipe(&self, reference: &Reference) -> CraneResult<Option<Recipe>> {
        let path = self.recipe_path(reference);
        if !path.is_file() {
            return Ok(None);
        }
        Recipe::from_path(&path)
            .map(Some)
            .map_err(|e| CraneError::RecipeEvaluation {
                reference: reference.to_string(),
                message: e.to_string(),
            })
    }

    /// Store a recipe under a concrete reference.
    ///
    /// A real package replaces an alias of the same reference.
    pub fn export_recipe(&self, reference: &Reference, recipe: &Recipe) -> CraneResult<PathBuf> {
        if reference.is_range() {
            return Err(CraneError::MalformedReference {
                reference: reference.to_string(),
                reason: "a recipe needs a concrete version".to_string(),
            });
        }
        // every requirement must at least parse
        for kind in RequirementKind::ORDER {
            recipe.requirements(kind)?;
        }

        {
            let _lock = self.lock_aliases()?;
            let store = self.load_aliases()?;
            if store.remove(reference) {
                self.save_aliases(&store)?;
            }
        }

        let content = recipe.to_string_pretty().map_err(|e| CraneError::Generic {
            message: format!("Failed to serialize recipe: {e}"),
        })?;
        let path = self.recipe_path(reference);
        write_atomic(&path, content.as_bytes())?;
        tracing::info!(%reference, path = %path.display(), "exported recipe");
        Ok(path)
    }

    /// Delete a stored recipe. Returns `false` if there was none.
    pub fn remove_recipe(&self, reference: &Reference) -> CraneResult<bool> {
        if !self.has_recipe(reference) {
            return Ok(false);
        }
        remove_dir_pruning(&self.recipe_dir(reference), &self.root)?;
        tracing::info!(%reference, "removed recipe");
        Ok(true)
    }

    /// Every stored reference named `name`, in reference order.
    pub fn list(&self, name: &str) -> CraneResult<Vec<Reference>> {
        let name_dir = self.root.join(name);
        let mut found = BTreeSet::new();
        for version in subdirs(&name_dir)? {
            for user in subdirs(&version)? {
                for channel in subdirs(&user)? {
                    if !channel.join(RECIPE_FILE).is_file() {
                        continue;
                    }
                    match reference_from_dirs(name, &version, &user, &channel) {
                        Some(reference) => {
                            found.insert(reference);
                        }
                        None => {
                            tracing::debug!(dir = %channel.display(), "skipping unrecognized store entry");
                        }
                    }
                }
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Stored references whose name contains `pattern` (case-insensitive).
    pub fn search(&self, pattern: &str) -> CraneResult<Vec<Reference>> {
        let needle = pattern.to_lowercase();
        let mut out = Vec::new();
        for dir in subdirs(&self.root)? {
            let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if name.to_lowercase().contains(&needle) {
                out.extend(self.list(&name)?);
            }
        }
        out.sort();
        Ok(out)
    }

    pub fn load_aliases(&self) -> CraneResult<AliasStore> {
        aliases::load(&self.aliases_path())
    }

    pub fn save_aliases(&self, store: &AliasStore) -> CraneResult<()> {
        aliases::save(&self.aliases_path(), store)
    }

    /// Define an alias and persist the table. Returns the previous target.
    ///
    /// The load-modify-save runs under the alias lock, so concurrent
    /// definitions from several processes are all kept.
    pub fn define_alias(
        &self,
        source: &Reference,
        target: &Reference,
    ) -> CraneResult<Option<Reference>> {
        let _lock = self.lock_aliases()?;
        let store = self.load_aliases()?;
        let previous = store.define(source.clone(), target.clone(), self)?;
        self.save_aliases(&store)?;
        Ok(previous)
    }

    /// Remove an alias and persist the table. Returns `false` if it did not exist.
    pub fn remove_alias(&self, source: &Reference) -> CraneResult<bool> {
        let _lock = self.lock_aliases()?;
        let store = self.load_aliases()?;
        if !store.remove(source) {
            return Ok(false);
        }
        self.save_aliases(&store)?;
        Ok(true)
    }
}

/// Exclusive hold on `aliases.toml`, released on drop.
struct AliasLock {
    path: PathBuf,
}

impl Drop for AliasLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove alias lock {}: {e}", self.path.display());
        }
    }
}

impl LocalStore {
    fn aliases_lock_path(&self) -> PathBuf {
        self.root.join(".aliases.lock")
    }

    /// Take the alias lock, waiting for another holder to finish.
    fn lock_aliases(&self) -> CraneResult<AliasLock> {
        crane_util::fs::ensure_dir(&self.root)?;
        let path = self.aliases_lock_path();
        let started = Instant::now();
        loop {
            match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(AliasLock { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(CraneError::Generic {
                            message: format!(
                                "Timed out waiting for the alias lock {}; remove it if no other crane process is running",
                                path.display()
                            ),
                        });
                    }
                    thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(CraneError::Io(e)),
            }
        }
    }
}

impl RecipeProvider for LocalStore {
    fn available_versions(&self, name: &str) -> CraneResult<Vec<Reference>> {
        self.list(name)
    }

    fn recipe(&self, reference: &Reference) -> CraneResult<Recipe> {
        self.get_recipe(reference)?
            .ok_or_else(|| CraneError::RecipeNotFound {
                reference: reference.to_string(),
            })
    }
}

impl PackageIndex for LocalStore {
    fn contains_package(&self, reference: &Reference) -> bool {
        self.has_recipe(reference)
    }
}

/// Child directories of `dir`, sorted. A missing directory has none.
fn subdirs(dir: &Path) -> CraneResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn reference_from_dirs(name: &str, version: &Path, user: &Path, channel: &Path) -> Option<Reference> {
    let file_name = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    let text = format!(
        "{name}/{}@{}/{}",
        file_name(version)?,
        file_name(user)?,
        file_name(channel)?
    );
    Reference::parse(&text).ok()
}
