//! Bundle-time environment substitution.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ENV_ACCESS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"\bprocess\.env(?:\.([A-Za-z_$][A-Za-z0-9_$]*)|\[\s*"([^"\\]*)"\s*\]|\[\s*'([^'\\]*)'\s*\])"#,
    )
    .ok()
});

/// Replace `process.env.NAME` (and the bracketed forms) with the JSON string literal of
/// `env[NAME]`.
///
/// Names missing from `env` are left as written. So are assignment targets
/// (`process.env.X = ...`), since a literal cannot be assigned to.
pub fn substitute_env(code: &str, env: &BTreeMap<String, String>) -> String {
    let Some(re) = ENV_ACCESS.as_ref() else {
        return code.to_string();
    };
    re.replace_all(code, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let end = caps.get(0).map(|m| m.end()).unwrap_or(code.len());
        if is_assignment(&code[end..]) {
            return whole.to_string();
        }

        match env.get(name) {
            Some(value) => serde_json::Value::String(value.clone()).to_string(),
            None => whole.to_string(),
        }
    })
    .into_owned()
}

/// Whether `rest` starts with an assignment operator (but not `==`/`===`).
fn is_assignment(rest: &str) -> bool {
    let rest = rest.trim_start();
    if rest.starts_with("==") || rest.starts_with("=>") {
        return false;
    }
    if rest.starts_with('=') {
        return true;
    }
    ["+=", "-=", "*=", "/=", "%=", "||=", "&&=", "??=", "|=", "&=", "^=", "++", "--"]
        .iter()
        .any(|op| rest.starts_with(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("LOG_SERVER_PORT".to_string(), "8123".to_string());
        env.insert("GREETING".to_string(), "say \"hi\"".to_string());
        env
    }

    #[test]
    fn test_dot_access_is_replaced() {
        let out = substitute_env("var port = process.env.LOG_SERVER_PORT;", &env());
        assert_eq!(out, r#"var port = "8123";"#);
    }

    #[test]
    fn test_bracket_access_is_replaced() {
        let out = substitute_env(
            r#"a(process.env["LOG_SERVER_PORT"], process.env['GREETING'])"#,
            &env(),
        );
        assert_eq!(out, r#"a("8123", "say \"hi\"")"#);
    }

    #[test]
    fn test_undefined_names_untouched() {
        let code = "if (process.env.NODE_ENV === 'production') {}";
        assert_eq!(substitute_env(code, &env()), code);
    }

    #[test]
    fn test_assignment_targets_untouched() {
        let code = "process.env.LOG_SERVER_PORT = '1'; process.env.GREETING += 'x';";
        assert_eq!(substitute_env(code, &env()), code);

        let out = substitute_env("process.env.LOG_SERVER_PORT == 8123", &env());
        assert_eq!(out, r#""8123" == 8123"#);
    }

    #[test]
    fn test_identifier_prefix_not_matched() {
        let code = "myprocess.env.LOG_SERVER_PORT";
        assert_eq!(substitute_env(code, &env()), code);
    }
}
