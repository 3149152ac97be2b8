//! Subprocess execution for version commands, package queries and install steps.
//!
//! Command lines are split shell-style and executed directly, without a
//! shell in between.

use log::debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{Result, SyncError};

/// A command to run
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program followed by its arguments
    pub argv: Vec<String>,
    /// Working directory (default: inherited)
    pub cwd: Option<PathBuf>,
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

impl CommandSpec {
    /// Build from an explicit program and arguments
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Build from a command line, split shell-style
    pub fn parse(line: &str) -> Result<Self> {
        let argv = shlex::split(line).ok_or_else(|| SyncError::Command {
            command: line.to_string(),
            reason: "unbalanced quotes".to_string(),
        })?;
        if argv.is_empty() {
            return Err(SyncError::Command {
                command: line.to_string(),
                reason: "empty command".to_string(),
            });
        }
        Ok(Self { argv, cwd: None })
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    /// Whether the program can be found on PATH (or is an existing path)
    pub fn is_available(&self) -> bool {
        which::which(self.program()).is_ok()
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }

    /// Run to completion and capture its output.
    ///
    /// A non-zero exit is not an error here; callers decide.
    pub async fn run(&self) -> Result<CommandOutput> {
        debug!("Running command: {}", self.display());
        let mut cmd = Command::new(self.program());
        cmd.args(&self.argv[1..]);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| SyncError::Command {
            command: self.display(),
            reason: e.to_string(),
        })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run and require a zero exit status
    pub async fn run_checked(&self) -> Result<CommandOutput> {
        let output = self.run().await?;
        if output.success {
            Ok(output)
        } else {
            Err(SyncError::Command {
                command: self.display(),
                reason: format!(
                    "exit code {:?}: {}",
                    output.code,
                    output.stderr_text().trim()
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted() {
        let spec = CommandSpec::parse("rpm --qf '%{VERSION}' -q foo").unwrap();
        assert_eq!(spec.argv, vec!["rpm", "--qf", "%{VERSION}", "-q", "foo"]);
        assert_eq!(spec.program(), "rpm");
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(CommandSpec::parse("   ").is_err());
    }

    #[test]
    fn test_parse_unbalanced_is_error() {
        assert!(CommandSpec::parse("echo 'oops").is_err());
    }

    #[test]
    fn test_is_available() {
        assert!(CommandSpec::new(["sh"]).is_available());
        assert!(!CommandSpec::new(["nonexistent_command_xyz123"]).is_available());
    }

    #[tokio::test]
    async fn test_run_echo() {
        let output = CommandSpec::parse("echo hello").unwrap().run().await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout_text().trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_failure_is_not_error() {
        let output = CommandSpec::new(["sh", "-c", "exit 3"]).run().await.unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
    }

    #[tokio::test]
    async fn test_run_checked_failure() {
        let result = CommandSpec::new(["sh", "-c", "echo boom >&2; exit 1"]).run_checked().await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("boom"));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let result = CommandSpec::new(["nonexistent_command_xyz123"]).run().await;
        assert!(matches!(result, Err(SyncError::Command { .. })));
    }

    #[tokio::test]
    async fn test_run_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let output = CommandSpec::new(["ls"]).current_dir(dir.path()).run().await.unwrap();
        assert!(output.stdout_text().contains("marker.txt"));
    }
}
