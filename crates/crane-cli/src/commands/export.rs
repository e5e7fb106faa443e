//! Handler for `crane export`.

use std::path::Path;

use miette::Result;

use crane_ops::ops_export;
use crane_store::local::LocalStore;

pub fn exec(store: &LocalStore, path: &Path, reference: &str) -> Result<()> {
    ops_export::export(store, path, reference)?;
    Ok(())
}
