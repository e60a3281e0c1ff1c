//! Command implementations.
//!
//! - [`build`] - one-shot compile, bundle and write
//! - [`watch`] - rebuild on change and live-reload the host
//! - [`init`] - write an example config, print its schema

pub mod build;
pub mod init;
pub mod watch;

pub use build::execute as build_execute;
pub use init::execute as init_execute;
pub use init::schema as schema_execute;
pub use watch::execute as watch_execute;

use crate::config::ConfigFile;
use crate::error::Result;
use std::path::Path;

/// Load and validate the config file.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    let file = ConfigFile::load(path)?;
    file.config.validate()?;
    Ok(file)
}
