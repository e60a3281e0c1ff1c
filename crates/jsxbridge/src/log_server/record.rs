use crate::formatter::{ErrorReport, RawException};
use crate::reload::bootstrap::ERROR_TAG;
use serde_json::Value;

/// One message POSTed by code running inside the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A runtime error, already formatted.
    Error(ErrorReport),
    /// Anything else.
    Value(Value),
}

/// Parse a request body. Malformed JSON yields `None`.
pub fn parse_record(body: &[u8]) -> Option<LogRecord> {
    serde_json::from_slice::<Value>(body).ok().map(classify)
}

/// Sort a parsed payload into an error report or a plain value.
pub fn classify(value: Value) -> LogRecord {
    let is_error = value.get("type").and_then(Value::as_str) == Some(ERROR_TAG);
    if !is_error {
        return LogRecord::Value(value);
    }

    if value.get("context").is_some() {
        if let Ok(report) = serde_json::from_value::<ErrorReport>(value.clone()) {
            return LogRecord::Error(report);
        }
    } else if value.get("source").is_some() {
        if let Ok(raw) = serde_json::from_value::<RawException>(value.clone()) {
            return LogRecord::Error(ErrorReport::from_exception(&raw));
        }
    }

    LogRecord::Value(value)
}

impl LogRecord {
    /// Plain-text rendering, as printed to the terminal.
    pub fn render(&self) -> String {
        match self {
            LogRecord::Error(report) => render_error(report),
            LogRecord::Value(Value::String(text)) => text.clone(),
            LogRecord::Value(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

fn render_error(report: &ErrorReport) -> String {
    format!(
        "Error: {} on line {}\nContext:\n\t{}\nStack:\n\t{}",
        report.message,
        report.display_line(),
        report.context.join("\n\t"),
        report.stack.join("\n\t")
    )
}
