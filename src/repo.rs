//! Package repository refresh.
//!
//! After a batch that downloaded RPM or DEB artifacts the package cache is
//! turned back into a usable repository: `createrepo` for RPM metadata and
//! `dpkg-scanpackages` for a gzipped `Packages` index.

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::command::CommandSpec;
use crate::error::{Result, SyncError};

/// Name batch-level refresh errors are reported under
pub const REPO_UPDATE: &str = "repo_update";

pub struct RepositoryRefresher {
    dir: PathBuf,
}

impl RepositoryRefresher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run both refresh steps; a failing step does not prevent the other.
    pub async fn refresh(&self) -> Vec<SyncError> {
        info!("Updating repo: {}", self.dir.display());
        let mut errors = Vec::new();
        if let Err(e) = self.rpm_metadata().await {
            errors.push(e);
        }
        if let Err(e) = self.deb_index().await {
            errors.push(e);
        }
        errors
    }

    async fn rpm_metadata(&self) -> Result<()> {
        let dir = self.dir.to_string_lossy();
        CommandSpec::new(["createrepo", dir.as_ref()])
            .run_checked()
            .await
            .map_err(|e| {
                SyncError::Refresh(format!("Failed to update RPM repo in {}: {}", dir, e))
            })?;
        Ok(())
    }

    async fn deb_index(&self) -> Result<()> {
        let output = CommandSpec::new(["dpkg-scanpackages", "-m", "."])
            .current_dir(&self.dir)
            .run_checked()
            .await
            .map_err(|e| {
                SyncError::Refresh(format!(
                    "Failed to generate Packages from {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;
        let target = self.dir.join("Packages.gz");
        write_gzip(&target, &output.stdout)?;
        debug!("Wrote {}", target.display());
        Ok(())
    }
}

/// Gzip `data` into `path`, replacing any existing file
pub fn write_gzip(path: &Path, data: &[u8]) -> Result<()> {
    let mut encoder = GzEncoder::new(File::create(path)?, Compression::default());
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(())
}
