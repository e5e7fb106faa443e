//! Command dispatch and handler modules.

mod alias;
mod export;
mod info;
mod inspect;
mod remove;
mod search;

use miette::Result;

use crane_core::config::GlobalConfig;
use crane_store::local::LocalStore;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = GlobalConfig::load()?;
    let store = LocalStore::from_config(&config);
    tracing::debug!(store = %store.root().display(), "using local store");

    match cli.command {
        Command::Export { path, reference } => export::exec(&store, &path, &reference),
        Command::Alias { alias, target } => alias::exec(&store, &alias, &target),
        Command::Remove { reference } => remove::exec(&store, &reference),
        Command::Inspect { reference } => inspect::exec(&store, &reference),
        Command::Info {
            path,
            graph,
            json,
            strict,
            depth,
            why,
            inverted,
        } => info::exec(
            &store,
            &config,
            path.as_deref(),
            graph,
            json,
            strict,
            depth,
            why,
            inverted,
        ),
        Command::Search { pattern } => search::exec(&store, &pattern),
    }
}
