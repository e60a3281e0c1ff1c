use super::{Delivery, DeliveryError, ReloadPayload, ReloadTransport};
use crate::log_server::{LogRecord, LogSink, parse_record};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Escape text for an AppleScript string literal.
pub fn applescript_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// AppleScript that runs `code` inside `app` through its `DoScript` command.
pub fn applescript_for(app: &str, code: &str) -> String {
    format!(
        "tell application \"{}\"\n  DoScript \"{}\"\nend tell\n",
        applescript_escape(app),
        applescript_escape(code)
    )
}

/// Delivers through `osascript` into a named application.
///
/// Whatever the host returns is relayed to the sink: error reports are pretty-printed,
/// anything else is printed as is.
#[derive(Debug, Clone)]
pub struct AutomationBridge {
    app: String,
    sink: Arc<dyn LogSink>,
    program: Option<PathBuf>,
}

impl AutomationBridge {
    pub fn new(app: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            app: app.into(),
            sink,
            program: None,
        }
    }

    /// Run `program` instead of the system `osascript`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    fn relay(&self, output: &str) {
        if output.is_empty() {
            return;
        }
        let record = parse_record(output.as_bytes())
            .unwrap_or_else(|| LogRecord::Value(serde_json::Value::String(output.to_string())));
        self.sink.record(record);
    }
}

#[async_trait]
impl ReloadTransport for AutomationBridge {
    async fn deliver(&self, payload: &ReloadPayload) -> Result<Delivery, DeliveryError> {
        let program = match &self.program {
            Some(program) => program.clone(),
            None if cfg!(target_os = "macos") => PathBuf::from("osascript"),
            None => {
                return Err(DeliveryError::Unsupported(
                    "The automation bridge needs osascript, which is only available on macOS; \
                     use devConnectPort to push over HTTP instead"
                        .to_string(),
                ));
            }
        };

        let script = tempfile::Builder::new()
            .prefix("jsxbridge-")
            .suffix(".scpt")
            .tempfile()?;
        tokio::fs::write(script.path(), applescript_for(&self.app, &payload.bootstrap)).await?;

        let output = Command::new(&program)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                DeliveryError::Bridge(format!("Failed to run {}: {}", program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DeliveryError::Bridge(if stderr.is_empty() {
                format!("{} exited with {}", program.display(), output.status)
            } else {
                stderr
            }));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        self.relay(&text);

        Ok(Delivery {
            output: (!text.is_empty()).then_some(text),
        })
    }

    fn describe(&self) -> String {
        format!("automation bridge -> {}", self.app)
    }
}
