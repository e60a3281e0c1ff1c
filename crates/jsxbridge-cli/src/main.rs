//! jsxbridge CLI entry point.
//!
//! Parses arguments, installs logging and dispatches to the subcommand.

use clap::Parser;
use jsxbridge_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.resolve() {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Watch(watch_args) => commands::watch_execute(watch_args).await,
        cli::Command::Init(init_args) => commands::init_execute(init_args).await,
        cli::Command::Schema => commands::schema_execute().await,
    };

    result.map_err(error::cli_error_to_miette)
}
