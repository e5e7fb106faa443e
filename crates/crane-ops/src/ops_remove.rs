//! Operation: remove a recipe or an alias from the local store.

use crane_store::local::LocalStore;
use crane_util::errors::CraneError;

/// What `remove` deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Recipe,
    Alias,
}

/// Remove the recipe stored under `reference`, or the alias if it is one.
pub fn remove(store: &LocalStore, reference: &str) -> miette::Result<Removed> {
    let reference = crate::parse_reference(reference)?;

    if store.remove_recipe(&reference)? {
        println!("{reference}: Removed recipe");
        return Ok(Removed::Recipe);
    }
    if store.remove_alias(&reference)? {
        println!("{reference}: Removed alias");
        return Ok(Removed::Alias);
    }

    Err(CraneError::Generic {
        message: format!("No recipe or alias found for '{reference}'"),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crane_core::recipe::Recipe;
    use crane_core::reference::Reference;

    #[test]
    fn removes_recipe_then_alias() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let target = Reference::parse("Pkg/0.1@user/testing").unwrap();
        let latest = Reference::parse("Pkg/latest@user/testing").unwrap();
        store.export_recipe(&target, &Recipe::new()).unwrap();
        store.define_alias(&latest, &target).unwrap();

        assert_eq!(remove(&store, "Pkg/0.1@user/testing").unwrap(), Removed::Recipe);
        assert_eq!(remove(&store, "Pkg/latest@user/testing").unwrap(), Removed::Alias);
        assert!(store.load_aliases().unwrap().is_empty());
    }

    #[test]
    fn remove_unknown_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalStore::new(tmp.path());
        let err = remove(&store, "Pkg/0.1").unwrap_err();
        assert!(err.to_string().contains("No recipe or alias found"));
    }
}
