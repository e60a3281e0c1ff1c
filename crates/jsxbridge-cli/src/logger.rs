//! Logging setup for the jsxbridge CLI.
//!
//! The library reports progress and failures as `tracing` events; this module installs the
//! subscriber that prints them.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsxbridge_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Built dist/index.jsx");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "jsxbridge=debug,jsxbridge_cli=debug";
const QUIET_FILTER: &str = "jsxbridge=error,jsxbridge_cli=error";
const DEFAULT_FILTER: &str = "jsxbridge=info,jsxbridge_cli=info";

/// Initialize the tracing subscriber.
///
/// Level, in order of precedence:
/// 1. `--verbose`: DEBUG for jsxbridge crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`
/// 4. INFO for jsxbridge crates
///
/// Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Whether colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them; otherwise stderr's terminal
/// capabilities decide.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
