//! Operation: export a recipe into the local store.

use std::path::{Path, PathBuf};

use crane_core::recipe::Recipe;
use crane_core::reference::Reference;
use crane_core::RECIPE_FILE;
use crane_store::local::LocalStore;

/// Export the recipe at `path` (a `recipe.toml` or a directory holding one)
/// under `reference`.
pub fn export(store: &LocalStore, path: &Path, reference: &str) -> miette::Result<Reference> {
    let reference = crate::parse_reference(reference)?;
    let recipe_path = recipe_file(path);
    if !recipe_path.is_file() {
        return Err(crane_util::errors::CraneError::Manifest {
            message: format!("No recipe found at {}", recipe_path.display()),
        }
        .into());
    }

    let recipe = Recipe::from_path(&recipe_path)?;
    store.export_recipe(&reference, &recipe)?;
    println!("{reference}: Exported");
    Ok(reference)
}

fn recipe_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(RECIPE_FILE)
    } else {
        path.to_path_buf()
    }
}
