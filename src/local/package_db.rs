//! Queries against RPM/DEB archives and the local RPM database.

use std::path::Path;

use crate::command::CommandSpec;
use crate::error::Result;

/// Read a header field (`VERSION`, `NAME`, ...) from an RPM file or URL
pub async fn rpm_file_field(path_or_url: &str, field: &str) -> Result<Option<String>> {
    let output = CommandSpec::new(["rpm", "--qf", &format!("%{{{}}}", field), "-qp", path_or_url])
        .run_checked()
        .await?;
    Ok(non_empty(&output.stdout_text()))
}

/// Installed version of an RPM package, `None` when it is not installed
pub async fn rpm_installed_version(package: &str) -> Result<Option<String>> {
    let output = CommandSpec::new(["rpm", "--qf", "%{VERSION}", "-q", package])
        .run()
        .await?;
    Ok(parse_rpm_query(&output.stdout_text()))
}

/// `Version:` field of a DEB archive
pub async fn deb_file_version(path: &Path) -> Result<Option<String>> {
    let path = path.to_string_lossy();
    let output = CommandSpec::new(["dpkg", "-I", path.as_ref()]).run_checked().await?;
    Ok(parse_dpkg_version(&output.stdout_text()))
}

/// rpm prints "package foo is not installed" on stdout instead of a version
pub fn parse_rpm_query(stdout: &str) -> Option<String> {
    if stdout.contains("not installed") {
        return None;
    }
    non_empty(stdout)
}

/// First `Version:` line of `dpkg -I` output
pub fn parse_dpkg_version(info: &str) -> Option<String> {
    info.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("Version:"))
        .and_then(non_empty)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
