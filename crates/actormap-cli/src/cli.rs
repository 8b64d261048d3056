//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "actormap",
    version,
    about = "Inspect actormap documents and exercise the state engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Coordinator configuration (TOML).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a document's catalog and state tree.
    Inspect {
        #[arg(value_name = "DOCUMENT")]
        path: PathBuf,
    },

    /// Check the state tree and every state's graph for broken references.
    Validate {
        #[arg(value_name = "DOCUMENT")]
        path: PathBuf,
    },

    /// Run a scripted session: branch, edit, undo, redo.
    Demo {
        /// Print the steps as JSON.
        #[arg(long)]
        json: bool,
    },
}
