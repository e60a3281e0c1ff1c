//! Terminal output: status lines and formatting.
//!
//! ```no_run
//! use jsxbridge_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Built dist/index.jsx");
//! ui::warning("Minification failed, kept the unminified artifact");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_size, print_artifact};
pub use messages::{error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to whether stderr is attended.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status lines are colored. `no_color` comes from `--no-color`.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Whether terminal output may use ANSI colours, as decided by [`init_colors`].
pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
