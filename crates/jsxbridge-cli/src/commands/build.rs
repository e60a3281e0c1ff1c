//! `jsxbridge build`.

use crate::cli::BuildArgs;
use crate::commands::load_config;
use crate::error::Result;
use crate::ui;
use jsxbridge::CompileOutcome;
use std::time::Instant;

/// Execute the build command.
///
/// Compile (when `tsEntry` is set), bundle, write and optionally minify. Compiler
/// diagnostics and minify failures are warnings; a bundle failure is an error.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let file = load_config(args.config.as_deref())?;
    let config = file.config.to_build_config(file.root());
    ui::info(&format!("Building {}", config.js_entry_path().display()));

    let report = jsxbridge::run_build(&config).await?;

    if let CompileOutcome::Diagnostics(_) = report.compile {
        ui::warning("Compiler reported errors, bundled the last emitted output");
    }
    if let Some(error) = &report.artifact.minify_error {
        ui::warning(&format!("Minification failed, wrote unminified output: {}", error));
    }

    ui::success("Build complete");
    ui::print_artifact(&report.artifact, start_time.elapsed());
    Ok(())
}
