use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available jsxbridge subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compile, bundle and write the artifact once
    ///
    /// Compiler diagnostics are printed but do not stop the build. No reload is sent.
    Build(BuildArgs),

    /// Watch inputs, rebuild on change and live-reload the host application
    ///
    /// Runs the compiler in watch mode, starts the log server when `logServerPort`
    /// is set, and pushes every successful rebuild into the host. Stop with Ctrl+C.
    Watch(WatchArgs),

    /// Write an example jsxbridge.config.json
    ///
    /// Creates the file in DIR (default: the current directory). An existing config is
    /// left untouched unless `--force` is given.
    Init(InitArgs),

    /// Print the JSON Schema of jsxbridge.config.json
    Schema,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    /// Config file (default: ./jsxbridge.config.json)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the watch command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WatchArgs {
    /// Config file (default: ./jsxbridge.config.json)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for the init command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    /// Directory to create the config in (default: current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}
