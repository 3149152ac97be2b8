//! Process-wide defaults merged beneath every tool definition.
//!
//! The file form is all-optional; [`Defaults::merge`] fills each missing
//! key from the built-in values. Only the `ver` and `git` groups merge key
//! by key, everything else is a plain per-field override.

use serde::{Deserialize, Serialize};

use super::definition::VersionRuleDef;

pub const DEFAULT_BIN_DIR: &str = "$HOME/bin";
pub const DEFAULT_OPT_DIR: &str = "/opt";
pub const DEFAULT_TMP_DIR: &str = "/tmp";
pub const DEFAULT_PKG_DIR: &str = "$HOME/Repos/packages";
pub const DEFAULT_VERSION_COMMAND: &str = "{{ tool.name }} --version";
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_API_BASE: &str = "https://api.github.com/repos";

/// How the local version of a tool is discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// Run a command and read its output
    Cmd,
    /// Glob for a file and read its path or contents
    File,
}

impl VersionSource {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "cmd" => Some(VersionSource::Cmd),
            "file" => Some(VersionSource::File),
            _ => None,
        }
    }
}

/// Fully-populated version-detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRule {
    #[serde(rename = "type")]
    pub source: VersionSource,
    /// Command template or file glob template
    pub name: String,
    pub regex: Option<String>,
}

impl Default for VersionRule {
    fn default() -> Self {
        Self {
            source: VersionSource::Cmd,
            name: DEFAULT_VERSION_COMMAND.to_string(),
            regex: None,
        }
    }
}

impl VersionRule {
    /// Overlay a partial rule; keys absent from `over` keep their value.
    pub fn overlay(&self, over: &VersionRuleDef) -> Self {
        let source = match over.kind.as_deref() {
            Some(kind) => VersionSource::parse(kind).unwrap_or_else(|| {
                log::warn!("Unknown version rule type '{}', keeping '{:?}'", kind, self.source);
                self.source.clone()
            }),
            None => self.source.clone(),
        };
        Self {
            source,
            name: over.name.clone().unwrap_or_else(|| self.name.clone()),
            regex: over.regex.clone().or_else(|| self.regex.clone()),
        }
    }
}

/// Release lookup defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitDefaults {
    /// Base URL the `owner/name` repository path is appended to
    pub api: String,
    pub look_up: String,
    pub tag: String,
    pub custom: bool,
    pub token_env: String,
}

impl Default for GitDefaults {
    fn default() -> Self {
        Self {
            api: DEFAULT_API_BASE.to_string(),
            look_up: "releases".to_string(),
            tag: "latest".to_string(),
            custom: false,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

/// Merged defaults used by every tool in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    pub bin_dir: String,
    pub opt_dir: String,
    pub tmp_dir: String,
    pub pkg_dir: String,
    pub ver: VersionRule,
    pub git: GitDefaults,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            bin_dir: DEFAULT_BIN_DIR.to_string(),
            opt_dir: DEFAULT_OPT_DIR.to_string(),
            tmp_dir: DEFAULT_TMP_DIR.to_string(),
            pkg_dir: DEFAULT_PKG_DIR.to_string(),
            ver: VersionRule::default(),
            git: GitDefaults::default(),
        }
    }
}

/// `defaults` section as written in the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsFile {
    pub bin_dir: Option<String>,
    pub opt_dir: Option<String>,
    pub tmp_dir: Option<String>,
    pub pkg_dir: Option<String>,
    pub ver: Option<VersionRuleDef>,
    pub git: Option<GitDefaultsFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitDefaultsFile {
    pub api: Option<String>,
    pub look_up: Option<String>,
    pub tag: Option<String>,
    pub custom: Option<super::definition::Flag>,
    pub token_env: Option<String>,
}

impl Defaults {
    /// Merge a file-level defaults section over the built-in values.
    pub fn merge(file: &DefaultsFile) -> Self {
        let builtin = Self::default();

        let ver = match &file.ver {
            Some(partial) => builtin.ver.overlay(partial),
            None => builtin.ver,
        };

        let git = match &file.git {
            Some(g) => GitDefaults {
                api: g.api.clone().unwrap_or(builtin.git.api),
                look_up: g.look_up.clone().unwrap_or(builtin.git.look_up),
                tag: g.tag.clone().unwrap_or(builtin.git.tag),
                custom: g.custom.as_ref().map(|f| f.is_set()).unwrap_or(builtin.git.custom),
                token_env: g.token_env.clone().unwrap_or(builtin.git.token_env),
            },
            None => builtin.git,
        };

        Self {
            bin_dir: file.bin_dir.clone().unwrap_or(builtin.bin_dir),
            opt_dir: file.opt_dir.clone().unwrap_or(builtin.opt_dir),
            tmp_dir: file.tmp_dir.clone().unwrap_or(builtin.tmp_dir),
            pkg_dir: file.pkg_dir.clone().unwrap_or(builtin.pkg_dir),
            ver,
            git,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults() {
        let d = Defaults::default();
        assert_eq!(d.bin_dir, "$HOME/bin");
        assert_eq!(d.pkg_dir, "$HOME/Repos/packages");
        assert_eq!(d.ver.source, VersionSource::Cmd);
        assert_eq!(d.ver.name, "{{ tool.name }} --version");
        assert!(d.ver.regex.is_none());
        assert_eq!(d.git.look_up, "releases");
        assert_eq!(d.git.tag, "latest");
        assert!(!d.git.custom);
        assert_eq!(d.git.token_env, "GITHUB_TOKEN");
        assert_eq!(d.git.api, "https://api.github.com/repos");
    }

    #[test]
    fn test_merge_empty_file_is_builtin() {
        assert_eq!(Defaults::merge(&DefaultsFile::default()), Defaults::default());
    }

    #[test]
    fn test_merge_scalar_override() {
        let file: DefaultsFile = serde_yaml::from_str("pkg_dir: /srv/repo\n").unwrap();
        let d = Defaults::merge(&file);
        assert_eq!(d.pkg_dir, "/srv/repo");
        assert_eq!(d.bin_dir, DEFAULT_BIN_DIR);
    }

    #[test]
    fn test_merge_nested_key_by_key() {
        let yaml = "ver:\n  regex: '(\\d+\\.\\d+)'\ngit:\n  token_env: GH_TOKEN\n";
        let file: DefaultsFile = serde_yaml::from_str(yaml).unwrap();
        let d = Defaults::merge(&file);
        assert_eq!(d.ver.regex.as_deref(), Some("(\\d+\\.\\d+)"));
        assert_eq!(d.ver.name, DEFAULT_VERSION_COMMAND);
        assert_eq!(d.ver.source, VersionSource::Cmd);
        assert_eq!(d.git.token_env, "GH_TOKEN");
        assert_eq!(d.git.look_up, "releases");
        assert_eq!(d.git.tag, "latest");
        assert_eq!(d.git.api, DEFAULT_API_BASE);
    }

    #[test]
    fn test_merge_custom_flag() {
        let file: DefaultsFile = serde_yaml::from_str("git:\n  custom: 1\n").unwrap();
        assert!(Defaults::merge(&file).git.custom);
    }

    #[test]
    fn test_overlay_file_rule() {
        let base = VersionRule::default();
        let over = VersionRuleDef {
            kind: Some("file".to_string()),
            name: Some("/opt/app-*/VERSION".to_string()),
            regex: None,
        };
        let rule = base.overlay(&over);
        assert_eq!(rule.source, VersionSource::File);
        assert_eq!(rule.name, "/opt/app-*/VERSION");
        assert!(rule.regex.is_none());
    }

    #[test]
    fn test_overlay_unknown_type_keeps_base() {
        let base = VersionRule::default();
        let over = VersionRuleDef {
            kind: Some("registry".to_string()),
            ..Default::default()
        };
        assert_eq!(base.overlay(&over).source, VersionSource::Cmd);
    }
}
