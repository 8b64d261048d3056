//! Actormap CLI
//!
//! Library half of the `actormap` binary: argument definitions, logging
//! setup and the subcommands, kept here so they can be tested without a
//! process boundary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::{inspect, load_config, load_document, render_steps, run_demo, validate, DemoStep};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
