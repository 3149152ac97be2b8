//! Tool definitions as they appear in the configuration file.

use serde::{Deserialize, Serialize};

use super::defaults::VersionSource;
use crate::error::{Result, SyncError};

/// Which remote resolver handles a tool.
///
/// Any `type` other than `git` or `direct` selects a vendor rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolKind {
    Git,
    Direct,
    #[default]
    Custom,
}

impl From<String> for ToolKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "git" => ToolKind::Git,
            "direct" => ToolKind::Direct,
            _ => ToolKind::Custom,
        }
    }
}

impl From<ToolKind> for String {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Git => "git".to_string(),
            ToolKind::Direct => "direct".to_string(),
            ToolKind::Custom => "custom".to_string(),
        }
    }
}

/// A yes/no switch that tolerates `true`, `1` and `"yes"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i == 1,
            Flag::Text(s) => s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true"),
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Bool(false)
    }
}

/// Partial version-detection rule; missing keys come from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRuleDef {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl VersionRuleDef {
    /// Reject a `type` other than `cmd` or `file`; `owner` names the rule in the error
    pub fn validate(&self, owner: &str) -> Result<()> {
        match self.kind.as_deref() {
            Some(kind) if VersionSource::parse(kind).is_none() => Err(SyncError::Config(format!(
                "{} has unknown version rule type '{}'",
                owner, kind
            ))),
            _ => Ok(()),
        }
    }
}

/// Page that publishes the latest version of a direct-download tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVersionPage {
    pub url: String,
    pub regex: String,
}

/// One trackable tool, exactly as configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: ToolKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_up: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incl: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excl: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inst: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<VersionRuleDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver_remote: Option<RemoteVersionPage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_dir: Option<String>,
}

impl ToolDefinition {
    /// Create a bare definition of the given kind
    pub fn new(name: impl Into<String>, kind: ToolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Check the keys each variant cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SyncError::Config("tool without a name".to_string()));
        }
        if let Some(ver) = &self.ver {
            ver.validate(&format!("tool '{}'", self.name))?;
        }
        match self.kind {
            ToolKind::Git if self.repo.is_none() => Err(SyncError::Config(format!(
                "tool '{}' of type git has no 'repo'",
                self.name
            ))),
            ToolKind::Direct | ToolKind::Custom if self.url.is_none() => Err(SyncError::Config(
                format!("tool '{}' has no 'url'", self.name),
            )),
            _ => Ok(()),
        }
    }

    /// Render the definition as YAML for verbose output
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
