//! Configuration for toolsync.
//!
//! A single YAML file holds an optional `defaults` section and the required
//! `tools` list. Search order:
//! 1. Explicit path if provided
//! 2. ~/.config/toolsync/toolsync.yml
//! 3. ./toolsync.yml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

mod defaults;
mod definition;

pub use defaults::{
    Defaults, DefaultsFile, GitDefaults, GitDefaultsFile, VersionRule, VersionSource,
    DEFAULT_BIN_DIR, DEFAULT_OPT_DIR, DEFAULT_PKG_DIR, DEFAULT_TMP_DIR, DEFAULT_TOKEN_ENV,
    DEFAULT_VERSION_COMMAND,
};
pub use definition::{Flag, RemoteVersionPage, ToolDefinition, ToolKind, VersionRuleDef};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: Option<String>,

    /// Upper bound on tools processed at once
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default)]
    pub defaults: DefaultsFile,

    pub tools: Vec<ToolDefinition>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_file(&candidate);
            }
        }

        Err(SyncError::Config(format!(
            "no configuration file found (looked for {}.yml in the config dir and the current dir)",
            project_name
        )))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| {
            if e.to_string().contains("missing field `tools`") {
                SyncError::Config("Missing section 'tools' in configuration file".to_string())
            } else {
                SyncError::Config(format!("Failed to parse config file: {}", e))
            }
        })?;

        if let Some(ver) = &config.defaults.ver {
            ver.validate("defaults")?;
        }
        for tool in &config.tools {
            tool.validate()?;
        }
        Ok(config)
    }

    /// Built-in defaults with the file's `defaults` section merged on top
    pub fn merged_defaults(&self) -> Defaults {
        Defaults::merge(&self.defaults)
    }

    /// Tool names in sorted order
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Tools selected by name; an empty selection or `all` keeps everything.
    pub fn select_tools(&self, names: &[String]) -> Vec<ToolDefinition> {
        if names.is_empty() || names.iter().any(|n| n == "all") {
            return self.tools.clone();
        }
        self.tools
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
defaults:
  pkg_dir: /srv/packages
  git:
    token_env: GH_TOKEN
tools:
  - name: ripgrep
    type: git
    repo: BurntSushi/ripgrep
    incl: [x86_64-unknown-linux-musl]
  - name: 7z
    url: https://www.7-zip.org/download.html
  - name: kubectl
    type: direct
    url: https://dl.k8s.io/release/v1.30.0/bin/linux/amd64/kubectl
"#;

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.tools.len(), 3);
        let defaults = config.merged_defaults();
        assert_eq!(defaults.pkg_dir, "/srv/packages");
        assert_eq!(defaults.git.token_env, "GH_TOKEN");
        assert_eq!(defaults.git.tag, "latest");
    }

    #[test]
    fn test_missing_tools_section_is_fatal() {
        let err = Config::from_yaml("defaults:\n  pkg_dir: /tmp\n").unwrap_err();
        assert!(err.to_string().contains("Missing section 'tools'"));
    }

    #[test]
    fn test_invalid_tool_is_fatal() {
        let err = Config::from_yaml("tools:\n  - name: fd\n    type: git\n").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_unknown_default_version_rule_type_is_fatal() {
        let yaml = "defaults:\n  ver:\n    type: registry\ntools: []\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("defaults has unknown version rule type"));
    }

    #[test]
    fn test_tool_names_sorted() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.tool_names(), vec!["7z", "kubectl", "ripgrep"]);
    }

    #[test]
    fn test_select_all() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.select_tools(&["all".to_string()]).len(), 3);
        assert_eq!(config.select_tools(&[]).len(), 3);
    }

    #[test]
    fn test_select_subset() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let selected = config.select_tools(&["kubectl".to_string(), "missing".to_string()]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "kubectl");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.yml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tools.len(), 3);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let path = PathBuf::from("/nonexistent/toolsync.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
