//! `$VAR` / `${VAR}` expansion for paths and commands.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("static regex"));

/// Replace environment references with their values.
///
/// Unset variables are left untouched.
pub fn expand_env(input: &str) -> String {
    ENV_REF
        .replace_all(input, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
