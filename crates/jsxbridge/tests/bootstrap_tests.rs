use jsxbridge::log_server::{LogRecord, parse_record};
use jsxbridge::reload::bootstrap::{ErrorChannel, render};
use std::path::Path;
use std::process::Command;

/// Run the rendered bootstrap under node with a stubbed host `$` whose `evalFile` throws
/// `thrown` (a JS expression). Returns the bootstrap's return value, or `None` when node is
/// not installed.
fn run_bootstrap(thrown: &str) -> Option<String> {
    let available = Command::new("node")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("node not found, skipping host bootstrap run");
        return None;
    }

    let bootstrap = render(Path::new("/work/dist/index.jsx"), ErrorChannel::Return);
    let harness = format!(
        "var $ = {{ global: {{}}, stack: '[bootstrap]\\nmain()', \
         writeln: function () {{}}, \
         evalFile: function () {{ throw {thrown}; }} }};\n\
         var result = {bootstrap}\n\
         process.stdout.write(String(result));\n"
    );

    let out = Command::new("node").arg("-e").arg(&harness).output().unwrap();
    assert!(
        out.status.success(),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );
    Some(String::from_utf8(out.stdout).unwrap())
}

#[test]
fn test_string_throw_reports_valid_json() {
    let Some(body) = run_bootstrap("'oops'") else {
        return;
    };

    let record = parse_record(body.as_bytes()).expect("report must be JSON");
    let LogRecord::Error(report) = record else {
        panic!("expected error report, got {:?}", record);
    };
    assert_eq!(report.name, "Error");
    assert_eq!(report.message, "oops");
    assert_eq!(report.line, -1);
    assert_eq!(report.context.len(), 5);
    assert_eq!(report.stack, vec!["main()"]);
}

#[test]
fn test_null_and_lineless_throws_report_valid_json() {
    for thrown in ["null", "undefined", "{ message: 'no line' }", "42"] {
        let Some(body) = run_bootstrap(thrown) else {
            return;
        };
        assert!(
            matches!(parse_record(body.as_bytes()), Some(LogRecord::Error(_))),
            "{} produced {}",
            thrown,
            body
        );
    }
}

#[test]
fn test_error_with_source_reports_context() {
    let Some(body) = run_bootstrap(
        "{ name: 'ReferenceError', message: 'foo is undefined', line: 3, source: 'a\\nb\\nfoo()\\nd' }",
    ) else {
        return;
    };

    let Some(LogRecord::Error(report)) = parse_record(body.as_bytes()) else {
        panic!("expected error report, got {}", body);
    };
    assert_eq!(report.name, "ReferenceError");
    assert_eq!(report.line, 2);
    assert_eq!(report.display_line(), 3);
    assert_eq!(report.context, vec!["a", "b", "foo()", "d", ""]);
}
