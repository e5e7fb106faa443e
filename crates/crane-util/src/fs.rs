use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `contents` to `path` by writing a sibling temp file and renaming it.
///
/// Readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    tracing::trace!(path = %path.display(), "wrote file");
    Ok(())
}

/// Remove a directory and then any parents below `stop_at` left empty.
pub fn remove_dir_pruning(dir: &Path, stop_at: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        std::fs::remove_dir_all(dir)?;
    }
    let mut current = dir.parent();
    while let Some(parent) = current {
        if parent == stop_at || !parent.starts_with(stop_at) {
            break;
        }
        let is_empty = std::fs::read_dir(parent)?.next().is_none();
        if !is_empty {
            break;
        }
        std::fs::remove_dir(parent)?;
        current = parent.parent();
    }
    Ok(())
}
