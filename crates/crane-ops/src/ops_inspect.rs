//! Operation: show what the store holds for a reference.

use std::fmt::Write as _;

use crane_core::reference::Reference;
use crane_store::local::LocalStore;
use crane_util::errors::CraneError;

/// Print the recipe or alias stored under `reference`.
pub fn inspect(store: &LocalStore, reference: &str) -> miette::Result<()> {
    let reference = crate::parse_reference(reference)?;
    print!("{}", describe(store, &reference)?);
    Ok(())
}

/// Render the store entry for `reference`.
///
/// An alias renders its target only; the recipe behind it is inspected
/// separately.
pub fn describe(store: &LocalStore, reference: &Reference) -> miette::Result<String> {
    let mut out = String::new();

    if let Some(target) = store.load_aliases()?.target(reference) {
        let _ = writeln!(out, "{reference}");
        let _ = writeln!(out, "alias: {target}");
        return Ok(out);
    }

    let Some(recipe) = store.get_recipe(reference)? else {
        return Err(CraneError::RecipeNotFound {
            reference: reference.to_string(),
        }
        .into());
    };

    let _ = writeln!(out, "{reference}");
    let _ = writeln!(
        out,
        "description: {}",
        recipe.description.as_deref().unwrap_or("None")
    );
    write_list(&mut out, "build_requires", &recipe.build_requires);
    write_list(&mut out, "requires", &recipe.requires);

    if !recipe.options.is_empty() {
        let _ = writeln!(out, "options:");
        for (name, allowed) in &recipe.options {
            if allowed.is_empty() {
                let _ = writeln!(out, "    {name}: ANY");
            } else {
                let _ = writeln!(out, "    {name}: {}", allowed.join(", "));
            }
        }
    }
    if !recipe.default_options.is_empty() {
        let _ = writeln!(out, "default_options:");
        for (name, value) in &recipe.default_options {
            let _ = writeln!(out, "    {name}={value}");
        }
    }
    Ok(out)
}

fn write_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{label}:");
    for item in items {
        let _ = writeln!(out, "    {item}");
    }
}
