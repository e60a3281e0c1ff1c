//! Formatting for sizes, durations and build results.

use super::colors_enabled;
use jsxbridge::Artifact;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format a byte count with the largest fitting unit (B, KB, MB, GB).
///
/// ```
/// use jsxbridge_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, `s` or `m s`.
///
/// ```
/// use std::time::Duration;
/// use jsxbridge_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print one line describing a written artifact.
pub fn print_artifact(artifact: &Artifact, duration: Duration) {
    let name = artifact.path.display().to_string();
    let size = format_size(artifact.size);
    let took = format!("({})", format_duration(duration));
    let minified = if artifact.minified { " minified" } else { "" };

    if colors_enabled() {
        eprintln!(
            "  {} {} {}{} {}",
            "▸".blue(),
            name.bright_white().bold(),
            size.dimmed(),
            minified.dimmed(),
            took.dimmed()
        );
    } else {
        eprintln!("  ▸ {} {}{} {}", name, size, minified, took);
    }
}
