//! Handler for `crane search`.

use miette::Result;

use crane_ops::ops_search;
use crane_store::local::LocalStore;

pub fn exec(store: &LocalStore, pattern: &str) -> Result<()> {
    ops_search::search(store, pattern)
}
