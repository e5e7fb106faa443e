//! Operation: resolve a consumer manifest and report the dependency graph.

use std::path::{Path, PathBuf};

use crane_core::config::ConflictPolicy;
use crane_core::manifest::Manifest;
use crane_core::MANIFEST_FILE;
use crane_resolver::events::ResolutionStatus;
use crane_resolver::export;
use crane_resolver::resolver::{Resolution, Resolver, RootRequest};
use crane_store::local::LocalStore;
use crane_util::errors::CraneError;
use crane_util::fs::{find_ancestor_with, write_atomic};

/// Options for `crane info`.
#[derive(Debug, Default)]
pub struct InfoOptions {
    /// Write the graph in dot format to this file instead of printing a tree.
    pub graph: Option<PathBuf>,
    /// Print the resolution as JSON.
    pub json: bool,
    /// Conflict policy for this pass.
    pub policy: ConflictPolicy,
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show only the path from the root to this package.
    pub why: Option<String>,
    /// Show who requires this package, up to the root.
    pub inverted: Option<String>,
}

/// Find the manifest to resolve.
///
/// `path` may name a manifest file or a directory; without one the search
/// walks up from `cwd`.
pub fn locate_manifest(path: Option<&Path>, cwd: &Path) -> miette::Result<PathBuf> {
    let found = match path {
        Some(p) if p.is_dir() => Some(p.join(MANIFEST_FILE)).filter(|m| m.is_file()),
        Some(p) => Some(p.to_path_buf()).filter(|m| m.is_file()),
        None => find_ancestor_with(cwd, MANIFEST_FILE).map(|dir| dir.join(MANIFEST_FILE)),
    };
    found.ok_or_else(|| {
        CraneError::Manifest {
            message: format!("Could not find {MANIFEST_FILE}"),
        }
        .into()
    })
}

/// Resolve the manifest at `manifest_path` against the store.
pub fn resolve(
    store: &LocalStore,
    manifest_path: &Path,
    policy: ConflictPolicy,
) -> miette::Result<Resolution> {
    let manifest = Manifest::from_path(manifest_path)?;
    let display = manifest_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| MANIFEST_FILE.to_string());
    let root = RootRequest::from_manifest(&display, &manifest)?;

    let aliases = store.load_aliases()?;
    tracing::debug!(
        manifest = %manifest_path.display(),
        aliases = aliases.len(),
        ?policy,
        "resolving"
    );
    let resolution = Resolver::new(store, &aliases)
        .with_policy(policy)
        .resolve(&root)?;
    Ok(resolution)
}

/// Resolve and print the result.
pub fn info(store: &LocalStore, manifest_path: &Path, opts: &InfoOptions) -> miette::Result<()> {
    let resolution = resolve(store, manifest_path, opts.policy)?;

    if opts.json {
        println!("{}", export::to_json(&resolution)?);
        return Ok(());
    }

    for event in &resolution.events {
        if event.status == ResolutionStatus::AlreadyInstalled {
            println!("{event}");
        }
    }
    if !resolution.overrides.is_empty() {
        print!("{}", resolution.overrides);
    }

    if let Some(ref path) = opts.graph {
        write_atomic(path, export::to_dot(&resolution.graph).as_bytes())
            .map_err(CraneError::Io)?;
        println!("Graph written to {}", path.display());
        return Ok(());
    }

    if let Some(ref target) = opts.why {
        match resolution.graph.find_path(target) {
            Some(path) => {
                println!("Path to {target}:");
                for (i, node) in path.iter().enumerate() {
                    println!("{}{node}", "  ".repeat(i));
                }
            }
            None => println!("Dependency '{target}' not found in the graph."),
        }
        return Ok(());
    }

    if let Some(ref target) = opts.inverted {
        let inverted = resolution.graph.print_inverted_tree(target);
        if inverted.is_empty() {
            println!("Dependency '{target}' not found in the graph.");
        } else {
            print!("{inverted}");
        }
        return Ok(());
    }

    print!("{}", resolution.graph.print_tree(opts.depth));
    Ok(())
}
