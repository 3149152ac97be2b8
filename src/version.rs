//! Version comparison and extraction.
//!
//! Versions are opaque strings. Two versions are considered equal when one
//! contains the other, which tolerates build metadata and decorations such
//! as `1.2.3` against `1.2.3-1.fc40` or `v1.2.3`.

use regex::Regex;

/// Whether the remote version differs meaningfully from the local one.
///
/// A missing side is never a mismatch: there is nothing to act on.
pub fn mismatch(remote: Option<&str>, local: Option<&str>) -> bool {
    match (remote, local) {
        (Some(remote), Some(local)) => !(remote.contains(local) || local.contains(remote)),
        _ => false,
    }
}

/// Pull a version out of `text`: the first capture group when the pattern
/// has one, the whole match otherwise.
pub fn extract(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    if pattern.captures_len() > 1 {
        caps.get(1).map(|m| m.as_str().to_string())
    } else {
        caps.get(0).map(|m| m.as_str().to_string())
    }
}

/// Drop a single leading `v` from a tag name.
pub fn strip_v(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Remove ANSI color sequences some tools print even when not on a tty.
pub fn strip_ansi(text: &str) -> String {
    static ANSI: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"\x1b\[[\d;]*m").expect("static regex"));
    ANSI.replace_all(text, "").into_owned()
}
