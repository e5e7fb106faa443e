//! Handler for `crane inspect`.

use miette::Result;

use crane_ops::ops_inspect;
use crane_store::local::LocalStore;

pub fn exec(store: &LocalStore, reference: &str) -> Result<()> {
    ops_inspect::inspect(store, reference)
}
