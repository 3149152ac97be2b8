//! Local state inspection.
//!
//! Works out what is already present on this machine for a tool: which
//! package-cache files belong to it and which version is installed. Runs
//! after remote resolution, because version rules may reference remote
//! fields and the package format decides how the version is read.

pub mod package_db;

use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::command::CommandSpec;
use crate::config::VersionSource;
use crate::domain::ResolvedTool;
use crate::error::{Result, SyncError};
use crate::template::{expand_env, TemplateRenderer};
use crate::version;

/// What was found locally for one tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    pub version: Option<String>,
    pub matching_files: Vec<String>,
}

/// Inspect the package cache and the installed version of a tool
pub async fn resolve_local(
    renderer: &TemplateRenderer,
    tool: &ResolvedTool,
) -> Result<LocalState> {
    let matching_files = matching_files(&tool.dirs.pkg, &tool.name)?;

    let version = match matching_files.first() {
        Some(first) if tool.is_rpm() => {
            let path = tool.dirs.pkg.join(first);
            match package_db::rpm_file_field(&path.to_string_lossy(), "NAME").await? {
                Some(package) => package_db::rpm_installed_version(&package).await?,
                None => None,
            }
        }
        Some(first) if tool.is_deb() => {
            package_db::deb_file_version(&tool.dirs.pkg.join(first)).await?
        }
        _ => match tool.ver.source {
            VersionSource::Cmd => command_version(renderer, tool).await?,
            VersionSource::File => file_version(renderer, tool)?,
        },
    };

    debug!("Local state of {}: {:?} {:?}", tool.name, version, matching_files);
    Ok(LocalState {
        version,
        matching_files,
    })
}

/// Cache entries whose name contains `tool_name`, case-insensitively.
///
/// A cache directory that does not exist yet holds nothing.
pub fn matching_files(dir: &Path, tool_name: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let needle = tool_name.to_lowercase();
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect();
    names.sort();
    Ok(names)
}

async fn command_version(
    renderer: &TemplateRenderer,
    tool: &ResolvedTool,
) -> Result<Option<String>> {
    let line = renderer.render(&tool.ver.name, &tool.template_context())?;
    let spec = CommandSpec::parse(&line)?;
    if !spec.is_available() {
        debug!("{} not on PATH, skipping version command", spec.program());
        return Ok(None);
    }

    let output = spec.run().await?;
    let text = version::strip_ansi(&output.stdout_text());
    let text = text.trim_matches('\n');

    match &tool.ver.regex {
        Some(rx) => Ok(version::extract(&Regex::new(rx)?, text)),
        None => {
            let trimmed = text.trim().trim_start_matches('v');
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
    }
}

fn file_version(renderer: &TemplateRenderer, tool: &ResolvedTool) -> Result<Option<String>> {
    let pattern = expand_env(&renderer.render(&tool.ver.name, &tool.template_context())?);
    let candidates: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    let path = newest(&candidates).ok_or_else(|| SyncError::FileNotFound(pattern.clone()))?;

    let Some(rx) = &tool.ver.regex else {
        return Ok(None);
    };
    let rx = Regex::new(rx)?;

    if let Some(found) = version::extract(&rx, &path.to_string_lossy()) {
        return Ok(Some(found));
    }

    let content = fs::read(&path)?;
    let content = String::from_utf8_lossy(&content);
    // later lines override earlier ones
    Ok(content
        .lines()
        .filter_map(|line| version::extract(&rx, line))
        .last())
}

/// Most recently created path; modification time stands in where the
/// filesystem does not record creation time.
pub fn newest(paths: &[PathBuf]) -> Option<PathBuf> {
    paths
        .iter()
        .filter_map(|p| {
            let meta = fs::metadata(p).ok()?;
            let stamp = meta
                .created()
                .or_else(|_| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((stamp, p))
        })
        .max_by_key(|(stamp, _)| *stamp)
        .map(|(_, p)| p.clone())
}
