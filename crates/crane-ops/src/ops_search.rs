//! Operation: search the local store by package name.

use crane_store::local::LocalStore;

/// Entries whose package name contains `pattern`, case-insensitively.
///
/// Aliases are listed after the recipes with their target.
pub fn matches(store: &LocalStore, pattern: &str) -> miette::Result<Vec<String>> {
    let mut lines: Vec<String> = store
        .search(pattern)?
        .iter()
        .map(|r| r.to_string())
        .collect();

    let needle = pattern.to_lowercase();
    for entry in store.load_aliases()?.entries() {
        if entry.source.name().to_lowercase().contains(&needle) {
            lines.push(format!("{} (alias of {})", entry.source, entry.target));
        }
    }
    Ok(lines)
}

/// Print the search results.
pub fn search(store: &LocalStore, pattern: &str) -> miette::Result<()> {
    let lines = matches(store, pattern)?;
    if lines.is_empty() {
        println!("No matches for '{pattern}'.");
        return Ok(());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
