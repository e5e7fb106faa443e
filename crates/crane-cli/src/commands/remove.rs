//! Handler for `crane remove`.

use miette::Result;

use crane_ops::ops_remove;
use crane_store::local::LocalStore;

pub fn exec(store: &LocalStore, reference: &str) -> Result<()> {
    ops_remove::remove(store, reference)?;
    Ok(())
}
