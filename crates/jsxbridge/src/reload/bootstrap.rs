//! Host-side bootstrap script.
//!
//! The bootstrap installs `$.global.errorToPretty`, evaluates the artifact with
//! `$.evalFile` and reports the outcome. It targets the host's ES3 dialect: no `JSON`, no
//! `let`, no arrow functions.
//!
//! `errorToPretty` is the host-side twin of [`ErrorReport::from_exception`]: it decrements
//! `err.line`, takes five lines of context around it and drops the first `$.stack` frame.
//!
//! [`ErrorReport::from_exception`]: crate::formatter::ErrorReport::from_exception

use crate::ReloadTarget;
use std::path::Path;

/// Message the bootstrap emits after a successful reload.
pub const RELOADED: &str = "Live-reloaded JSX";

/// Tag on error payloads sent by the bootstrap.
pub const ERROR_TAG: &str = "__ERROR__";

/// Where the bootstrap sends a formatted runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorChannel {
    /// Return the JSON report as the script's value (automation bridge).
    Return,
    /// POST the JSON report to the log server on `127.0.0.1:port`.
    LogServer { port: u16 },
    /// Write the report to the host console.
    Console,
}

impl ErrorChannel {
    /// Channel for a reload target: the bridge's return value, the log server when one is
    /// running, the host console otherwise.
    pub fn for_target(target: Option<&ReloadTarget>, log_server_port: Option<u16>) -> Self {
        match (target, log_server_port) {
            (Some(ReloadTarget::AutomationBridge { .. }), _) => ErrorChannel::Return,
            (_, Some(port)) => ErrorChannel::LogServer { port },
            (_, None) => ErrorChannel::Console,
        }
    }
}

const TEMPLATE: &str = r#"(function () {
  $.global.errorToPretty = function (err) {
    var stack = $.stack.split('\n');
    stack.shift();
    if (err === null || typeof err !== 'object') {
      err = { name: 'Error', message: String(err), line: 0 };
    }
    var lines = (typeof err.source === 'string' && err.source.split('\n')) || [];
    if (!isFinite(err.line) || err.line === null) {
      err.line = 0;
    }
    err.line--;
    return {
      name: err.name === undefined ? 'Error' : err.name,
      message: err.message === undefined ? String(err) : err.message,
      line: err.line,
      context: [
        lines[err.line - 2] || '',
        lines[err.line - 1] || '',
        lines[err.line] || '',
        lines[err.line + 1] || '',
        lines[err.line + 2] || ''
      ],
      stack: stack
    };
  };

  function quote(value) {
    return '"' + String(value)
      .replace(/\\/g, '\\\\')
      .replace(/"/g, '\\"')
      .replace(/\r/g, '\\r')
      .replace(/\n/g, '\\n')
      .replace(/\t/g, '\\t') + '"';
  }

  function quoteAll(values) {
    var out = [];
    for (var i = 0; i < values.length; i++) {
      out.push(quote(values[i]));
    }
    return '[' + out.join(',') + ']';
  }

  function encode(report) {
    return '{"type":"__ERROR_TAG__"' +
      ',"name":' + quote(report.name) +
      ',"message":' + quote(report.message) +
      ',"line":' + (isFinite(report.line) && report.line !== null ? Number(report.line) : null) +
      ',"context":' + quoteAll(report.context) +
      ',"stack":' + quoteAll(report.stack) + '}';
  }

__REPORT__

  try {
    $.evalFile(__ARTIFACT__);
    $.writeln('__RELOADED__');
    return '__RELOADED__';
  } catch (err) {
    return report(encode($.global.errorToPretty(err)));
  }
})();
"#;

const REPORT_RETURN: &str = r#"  function report(json) {
    $.writeln('Unable to livereload: ' + json);
    return json;
  }"#;

const REPORT_CONSOLE: &str = r#"  function report(json) {
    $.writeln('Unable to livereload: ' + json);
    return 'Unable to livereload';
  }"#;

const REPORT_LOG_SERVER: &str = r#"  function report(json) {
    var body = unescape(encodeURIComponent(json));
    var conn = new Socket();
    conn.encoding = 'BINARY';
    if (conn.open('127.0.0.1:__PORT__')) {
      conn.write('POST / HTTP/1.1\r\n' +
        'Host: 127.0.0.1:__PORT__\r\n' +
        'Content-Type: application/json\r\n' +
        'Content-Length: ' + body.length + '\r\n' +
        'Connection: close\r\n\r\n' + body);
      conn.read(999999);
      conn.close();
    } else {
      $.writeln('Unable to livereload: ' + json);
    }
    return 'Unable to livereload';
  }"#;

/// Render the bootstrap for `artifact`.
pub fn render(artifact: &Path, channel: ErrorChannel) -> String {
    let report = match channel {
        ErrorChannel::Return => REPORT_RETURN.to_string(),
        ErrorChannel::Console => REPORT_CONSOLE.to_string(),
        ErrorChannel::LogServer { port } => {
            REPORT_LOG_SERVER.replace("__PORT__", &port.to_string())
        }
    };

    // JSON string syntax is a valid JS string literal
    let artifact = serde_json::Value::String(artifact.to_string_lossy().into_owned()).to_string();

    TEMPLATE
        .replace("__REPORT__", &report)
        .replace("__RELOADED__", RELOADED)
        .replace("__ERROR_TAG__", ERROR_TAG)
        .replace("__ARTIFACT__", &artifact)
}
