//! Structured error reports for exceptions thrown inside the host runtime.
//!
//! The host has no debugger, so a failing script is reported as its message, a window of
//! surrounding source lines and the native call stack. The same algorithm runs inside the
//! host (see [`crate::reload::bootstrap`]) and here, for raw exceptions that reach the log
//! server without a context window.
//!
//! # Line numbering
//!
//! The host reports 1-based line numbers, one greater than the index of the failing line in
//! `source.split('\n')`. The formatter decrements the reported line once; `ErrorReport::line`
//! is that zero-based index and the center context entry is source line `L` for a reported
//! line `L`.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of context lines in a report.
pub const CONTEXT_LINES: usize = 5;

/// Exception fields as the host runtime exposes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawException {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// 1-based line number as reported by the host.
    #[serde(default, deserialize_with = "nullable_line")]
    pub line: i64,
    /// Full text of the script that threw.
    #[serde(default)]
    pub source: String,
    /// Native call stack, one frame per line, wrapper frame first.
    #[serde(default)]
    pub stack: String,
}

/// A formatted runtime error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// Zero-based index of the failing line.
    #[serde(default, deserialize_with = "nullable_line")]
    pub line: i64,
    pub context: Vec<String>,
    pub stack: Vec<String>,
}

impl ErrorReport {
    /// Format a raw exception.
    pub fn from_exception(raw: &RawException) -> Self {
        let lines: Vec<&str> = raw.source.split('\n').collect();
        let line = raw.line.saturating_sub(1);

        Self {
            name: raw.name.clone(),
            message: raw.message.clone(),
            line,
            context: context_window(&lines, line),
            stack: clean_stack(&raw.stack),
        }
    }

    /// Human-facing 1-based line number.
    pub fn display_line(&self) -> i64 {
        self.line.saturating_add(1)
    }
}

/// Hosts report `null` for exceptions without a source position.
fn nullable_line<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lines `center - 2 ..= center + 2`; indices outside the source become empty strings.
pub fn context_window(lines: &[&str], center: i64) -> Vec<String> {
    let half = (CONTEXT_LINES / 2) as i64;
    (-half..=half)
        .map(|offset| {
            center
                .checked_add(offset)
                .and_then(|idx| usize::try_from(idx).ok())
                .and_then(|i| lines.get(i))
                .map(|l| l.to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Split the native stack into frames, dropping the wrapper's own frame.
pub fn clean_stack(stack: &str) -> Vec<String> {
    stack
        .split('\n')
        .skip(1)
        .map(|frame| frame.trim_end_matches('\r').to_string())
        .collect()
}
