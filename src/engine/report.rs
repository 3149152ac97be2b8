//! Batch-level results.

use std::path::PathBuf;

use crate::domain::ResolvedTool;
use crate::error::SyncError;

/// Progress notifications emitted while a batch runs
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A tool finished; its output lines are complete
    ToolDone(&'a ResolvedTool),
    /// The package repository is about to be refreshed
    RefreshStarted(&'a PathBuf),
}

/// Everything a batch produced besides per-tool output
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Errors in completion order, keyed by tool name (or `repo_update`)
    pub errors: Vec<(String, SyncError)>,
    pub processed: usize,
    /// At least one RPM or DEB artifact was downloaded
    pub packages_downloaded: bool,
    /// Repository that was refreshed, if any
    pub refreshed: Option<PathBuf>,
}

impl BatchReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Move a finished tool's errors into the report
    pub(crate) fn absorb(&mut self, tool: &mut ResolvedTool) {
        self.processed += 1;
        if tool.dl_ok && tool.format.is_system_package() {
            self.packages_downloaded = true;
        }
        let name = tool.name.clone();
        self.errors
            .extend(tool.errors.drain(..).map(|e| (name.clone(), e)));
    }

    /// Errors for one name
    pub fn errors_for(&self, name: &str) -> Vec<&SyncError> {
        self.errors
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, e)| e)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Defaults, ToolDefinition, ToolKind};
    use crate::domain::RemoteRelease;

    #[test]
    fn test_absorb_moves_errors() {
        let mut tool = ResolvedTool::new(
            ToolDefinition::new("fd", ToolKind::Git),
            &Defaults::default(),
        );
        tool.record_error(SyncError::NoAsset);
        let mut report = BatchReport::default();
        report.absorb(&mut tool);

        assert!(tool.errors.is_empty());
        assert_eq!(report.processed, 1);
        assert_eq!(report.errors_for("fd").len(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn test_absorb_tracks_package_downloads() {
        let mut tool = ResolvedTool::new(
            ToolDefinition::new("ads", ToolKind::Custom),
            &Defaults::default(),
        );
        tool.apply_remote(RemoteRelease {
            package_url: "https://x/ads.rpm".to_string(),
            package_name: "ads.rpm".to_string(),
            ..Default::default()
        });
        let mut report = BatchReport::default();
        report.absorb(&mut tool);
        assert!(!report.packages_downloaded);

        tool.dl_ok = true;
        report.absorb(&mut tool);
        assert!(report.packages_downloaded);
        assert!(!report.has_errors());
    }
}
