//! CLI argument definitions for Crane.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "crane",
    version,
    about = "Alias-aware dependency resolver",
    long_about = "Crane resolves a consumer's package requirements against a local store, \
                  following aliases and version ranges, into a single deduplicated graph."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a recipe into the local store
    Export {
        /// Path to a recipe.toml or a directory containing one
        path: PathBuf,
        /// Reference to store it under (name/version@user/channel)
        reference: String,
    },

    /// Define or redefine an alias
    Alias {
        /// Alias reference
        alias: String,
        /// Reference the alias points to
        target: String,
    },

    /// Remove a recipe or an alias from the local store
    #[command(alias = "rm")]
    Remove {
        /// Reference to remove
        reference: String,
    },

    /// Show the stored recipe or alias for a reference
    Inspect {
        /// Reference to inspect
        reference: String,
    },

    /// Resolve a manifest and print its dependency graph
    Info {
        /// Crane.toml or the directory containing it (default: search upwards)
        path: Option<PathBuf>,
        /// Write the graph in dot format to this file
        #[arg(long, value_name = "FILE")]
        graph: Option<PathBuf>,
        /// Print the resolution as JSON
        #[arg(long, conflicts_with = "graph")]
        json: bool,
        /// Fail on any version conflict instead of reporting overrides
        #[arg(long)]
        strict: bool,
        /// Maximum tree depth
        #[arg(long)]
        depth: Option<u32>,
        /// Explain why a package is included
        #[arg(long)]
        why: Option<String>,
        /// Show the packages that require this one
        #[arg(long, value_name = "PACKAGE")]
        inverted: Option<String>,
    },

    /// Search the local store by package name
    Search {
        /// Name fragment, matched case-insensitively
        pattern: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
