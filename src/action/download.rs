//! Download: fetch the artifact into the package cache when it is missing
//! or stale.

use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::domain::ResolvedTool;
use crate::error::{Result, SyncError};
use crate::remote::RemoteFileInfo;

use super::{headline, ActionContext};

/// Size and modification time of the cached artifact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFile {
    pub size: u64,
    /// Whole seconds, matching the resolution of HTTP dates
    pub modified: DateTime<Utc>,
}

impl LocalFile {
    /// Stat `path`; `None` when it does not exist
    pub fn stat(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let meta = fs::metadata(path)?;
        let modified: DateTime<Utc> = meta.modified()?.into();
        let modified = DateTime::from_timestamp(modified.timestamp(), 0).unwrap_or(modified);
        Ok(Some(Self {
            size: meta.len(),
            modified,
        }))
    }
}

/// Why a download was started
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadTrigger {
    Forced,
    Missing,
    SizeDiffers { local: u64, remote: u64 },
    Newer { local: DateTime<Utc>, remote: DateTime<Utc> },
}

impl DownloadTrigger {
    fn describe(&self) -> Vec<String> {
        match self {
            Self::Forced => vec!["        Download forced".to_string()],
            Self::Missing => vec!["        Local file does not exist".to_string()],
            Self::SizeDiffers { local, remote } => vec![
                "        Local file exists but has different size".to_string(),
                format!("        Local file size: {}", local),
                format!("       Remote file size: {}", remote),
            ],
            Self::Newer { local, remote } => vec![
                "        Local file exists but is older".to_string(),
                format!("        Local file date: {}", local),
                format!("       Remote file date: {}", remote),
            ],
        }
    }
}

/// Decide whether to download, checking in order: forced, missing locally,
/// size differs, remote newer.
///
/// A missing `Content-Length` skips the size comparison and a missing date
/// skips the age comparison.
pub fn evaluate(
    force: bool,
    local: Option<&LocalFile>,
    remote: Option<&RemoteFileInfo>,
) -> Option<DownloadTrigger> {
    if force {
        return Some(DownloadTrigger::Forced);
    }
    let local = match local {
        Some(local) => local,
        None => return Some(DownloadTrigger::Missing),
    };
    let remote = remote?;

    match remote.content_length {
        Some(size) if size != local.size => {
            return Some(DownloadTrigger::SizeDiffers {
                local: local.size,
                remote: size,
            });
        }
        _ => {}
    }
    match remote.last_modified {
        Some(date) if date > local.modified => Some(DownloadTrigger::Newer {
            local: local.modified,
            remote: date,
        }),
        _ => None,
    }
}

pub async fn download(ctx: &ActionContext<'_>, tool: &mut ResolvedTool) -> Result<()> {
    let opts = ctx.options;
    let (url, name, path) = match (&tool.pkg_url, &tool.pkg_name, tool.package_path()) {
        (Some(url), Some(name), Some(path)) => (url.clone(), name.clone(), path),
        _ => return Err(SyncError::Resolution("no package resolved".to_string())),
    };

    let local = if opts.force { None } else { LocalFile::stat(&path)? };
    let remote = match (&local, opts.force) {
        (Some(_), false) => Some(ctx.http.probe(&url).await?),
        _ => None,
    };

    match evaluate(opts.force, local.as_ref(), remote.as_ref()) {
        Some(trigger) => {
            if opts.verbose >= 2 {
                for line in trigger.describe() {
                    tool.push_output(line);
                }
            }
            tool.push_output(headline(&tool.name, true));
            if opts.verbose >= 2 {
                tool.push_output(format!("        Downloading package {}", name));
            }
            ctx.http.download(&url, &tool.dirs.pkg, &name).await?;
            if opts.verbose >= 1 {
                let done = format!("        Downloaded {}", name);
                tool.push_output(done.green().to_string());
            }
            tool.dl_ok = true;
        }
        None if !opts.skip_current => {
            tool.push_output(headline(&tool.name, false));
            if opts.verbose >= 2 {
                tool.push_output(format!("        Not downloading package: {}", name));
                tool.push_output(format!("        Existing local packages: {:?}", tool.pkg_local));
                if let Some(local) = &local {
                    tool.push_output(format!("        Local file size: {}", local.size));
                    tool.push_output(format!("        Local file date: {}", local.modified));
                }
                if let Some(remote) = &remote {
                    let size = remote.content_length.map(|s| s.to_string());
                    let date = remote.last_modified.map(|d| d.to_string());
                    tool.push_output(format!(
                        "        Remote file size: {}",
                        size.as_deref().unwrap_or("unknown")
                    ));
                    tool.push_output(format!(
                        "        Remote file date: {}",
                        date.as_deref().unwrap_or("unknown")
                    ));
                }
            }
        }
        None => {}
    }
    Ok(())
}
