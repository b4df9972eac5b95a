use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` and `{{ env.VAR | default("x") }}` placeholders
///
/// Works on the raw TOML text so that config structs hold plain values.
/// Comment lines are copied through untouched.
pub fn expand_env(input: &str) -> Result<String, String> {
    input.split_inclusive('\n').map(expand_line).collect()
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
    })
}

fn expand_line(line: &str) -> Result<String, String> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut failure = None;
    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        resolve(&captures[1], captures.get(2).map(|m| m.as_str())).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            String::new()
        })
    });

    failure.map_or_else(|| Ok(expanded.into_owned()), Err)
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(var) = key
        .strip_prefix("env.")
        .filter(|name| !name.is_empty() && !name.contains('.'))
    else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var}`")),
    }
}
