//! jsxbridge CLI.
//!
//! Command-line front end for the [`jsxbridge`] library: loads `jsxbridge.config.json`, then
//! runs a one-shot build or a watch session that live-reloads the host application.
//!
//! # Modules
//!
//! - [`cli`] - argument parsing
//! - [`config`] - config file loading and validation
//! - [`commands`] - `build`, `watch`, `init` and `schema`
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing setup
//! - [`ui`] - status lines and formatting
//!
//! # Example
//!
//! ```rust,no_run
//! use jsxbridge_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
