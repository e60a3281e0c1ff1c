//! Conversion from CLI errors to miette reports.

use crate::error::CliError;
use miette::Report;

/// Convert a `CliError` to a miette `Report`. Library errors keep their diagnostic code and
/// help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Core(e) => Report::new(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}
