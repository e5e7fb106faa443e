//! Handler for `crane alias`.

use miette::Result;

use crane_ops::ops_alias;
use crane_store::local::LocalStore;

pub fn exec(store: &LocalStore, alias: &str, target: &str) -> Result<()> {
    ops_alias::alias(store, alias, target)?;
    Ok(())
}
