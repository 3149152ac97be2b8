//! Error types for toolsync
//!
//! Centralized error handling using thiserror. Per-tool failures are stored
//! as `SyncError` values on the tool being processed and reported at the end
//! of a batch, so every variant renders a self-contained message.

use thiserror::Error;

/// All error types that can occur while syncing tools
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration file is structurally invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote metadata could not be resolved
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// The release-hosting API returned a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// More than one release asset survived filtering
    #[error("Found more than one asset: {0:?}")]
    AmbiguousAsset(Vec<String>),

    /// No release asset survived filtering
    #[error("No asset matched the filters")]
    NoAsset,

    /// Lookup mode is not one of releases, tags, branches
    #[error("Not recognized look up: {0}")]
    UnknownLookup(String),

    /// No vendor rule registered for this tool
    #[error("No vendor rule registered for '{0}'")]
    UnknownVendor(String),

    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// A subprocess could not be started or reported failure
    #[error("Command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    /// An install step exited non-zero
    #[error("Step {step}/{total}: failed ({command})")]
    InstallStep {
        step: usize,
        total: usize,
        command: String,
    },

    /// Version file pattern matched nothing
    #[error("File '{0}' not found")]
    FileNotFound(String),

    /// Artifact download failed
    #[error("Download failed: {0}")]
    Download(String),

    /// Repository metadata refresh failed
    #[error("Repository refresh failed: {0}")]
    Refresh(String),

    /// Worker task ended abnormally
    #[error("Worker aborted: {0}")]
    Worker(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid regular expression in a tool definition
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Invalid glob pattern in a version rule
    #[error("Glob error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Result type alias for toolsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_asset_lists_names() {
        let err = SyncError::AmbiguousAsset(vec!["a.tar.gz".to_string(), "b.tar.gz".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("more than one asset"));
        assert!(msg.contains("a.tar.gz"));
        assert!(msg.contains("b.tar.gz"));
    }

    #[test]
    fn test_unknown_lookup_error() {
        let err = SyncError::UnknownLookup("commits".to_string());
        assert_eq!(err.to_string(), "Not recognized look up: commits");
    }

    #[test]
    fn test_install_step_error() {
        let err = SyncError::InstallStep {
            step: 2,
            total: 3,
            command: "tar xf pkg.tar.gz".to_string(),
        };
        assert_eq!(err.to_string(), "Step 2/3: failed (tar xf pkg.tar.gz)");
    }

    #[test]
    fn test_http_status_error() {
        let err = SyncError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://example.com");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Json(_)));
    }

    #[test]
    fn test_regex_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: SyncError = regex_err.into();
        assert!(matches!(err, SyncError::Regex(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(SyncError::NoAsset)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
