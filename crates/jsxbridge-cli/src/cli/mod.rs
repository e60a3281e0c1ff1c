//! Command-line interface definition.
//!
//! ```text
//! jsxbridge [build|watch] [CONFIG]
//! jsxbridge init [DIR] [--force]
//! jsxbridge schema
//! ```
//!
//! With no subcommand the tool watches. A lone argument that is not a subcommand is the
//! config path for `watch`.

mod commands;
mod tests;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{BuildArgs, Command, InitArgs, WatchArgs};

/// jsxbridge - compile, bundle and live-reload scripts into a running host application
#[derive(Parser, Debug)]
#[command(
    name = "jsxbridge",
    version,
    about = "Compile, bundle and live-reload scripts into a running host application",
    long_about = "jsxbridge compiles a TypeScript project, bundles it into a single script,\n\
                  optionally minifies it, and pushes every rebuild into the running host\n\
                  application. Runtime errors raised inside the host are relayed back to\n\
                  the terminal."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute (default: watch)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file for the default `watch` command
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The command to run, defaulting to `watch`.
    pub fn resolve(self) -> Command {
        match self.command {
            Some(command) => command,
            None => Command::Watch(WatchArgs {
                config: self.config,
            }),
        }
    }
}
