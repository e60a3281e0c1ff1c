//! `jsxbridge init` and `jsxbridge schema`.

use crate::cli::InitArgs;
use crate::config::{CONFIG_FILE_NAME, JsxbridgeConfig};
use crate::error::{CliError, Result};
use crate::ui;
use std::fs;

/// Execute the init command: write an example config into the target directory.
///
/// # Errors
///
/// - the directory does not exist
/// - a config file is already there and `--force` was not given
pub async fn execute(args: InitArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    if !dir.is_dir() {
        return Err(CliError::FileNotFound(dir));
    }

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        )));
    }

    let mut content = JsxbridgeConfig::example_config()?;
    content.push('\n');
    fs::write(&path, content)?;

    ui::success(&format!("Created {}", path.display()));
    ui::info("Set `app` for the automation bridge or `devConnectPort` for the companion extension");
    Ok(())
}

/// Execute the schema command: print the config JSON Schema to stdout.
pub async fn schema() -> Result<()> {
    let schema = serde_json::to_string_pretty(&JsxbridgeConfig::json_schema())?;
    println!("{}", schema);
    Ok(())
}
