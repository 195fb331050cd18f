use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in raw configuration text
///
/// `{{ env.VAR | default("fallback") }}` falls back when the variable is
/// unset. Comment lines are left untouched so commented-out settings never
/// require their variables. The first unresolved placeholder is reported.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut failure = None;

    let lines: Vec<String> = input
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_owned();
            }

            placeholder()
                .replace_all(line, |captures: &Captures<'_>| {
                    let default = captures.get(2).map(|m| m.as_str());
                    resolve(&captures[1], default).unwrap_or_else(|error| {
                        failure.get_or_insert(error);
                        String::new()
                    })
                })
                .into_owned()
        })
        .collect();

    match failure {
        Some(error) => Err(error),
        None => Ok(lines.join("\n")),
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 1: variable key, 2: optional default("...") value
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#)
            .expect("placeholder pattern is valid")
    })
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    std::env::var(name).or_else(|_| {
        default
            .map(ToOwned::to_owned)
            .ok_or_else(|| format!("environment variable not found: `{name}`"))
    })
}
