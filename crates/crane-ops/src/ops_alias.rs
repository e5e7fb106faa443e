//! Operation: define an alias in the local store.

use crane_core::reference::Reference;
use crane_store::local::LocalStore;

/// Point `alias` at `target`, replacing any previous definition.
///
/// The target does not have to exist yet; it is only looked up when a
/// resolution follows the alias.
pub fn alias(store: &LocalStore, alias: &str, target: &str) -> miette::Result<Option<Reference>> {
    let source = crate::parse_reference(alias)?;
    let target = crate::parse_reference(target)?;
    let previous = store.define_alias(&source, &target)?;

    match &previous {
        Some(old) if *old != target => println!("{source}: Alias redefined {old} -> {target}"),
        _ => println!("{source}: Alias created -> {target}"),
    }
    Ok(previous)
}
