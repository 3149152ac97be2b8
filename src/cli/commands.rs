//! CLI definition using clap.
//!
//! One invocation runs one mode over the selected tools:
//! - list: print the configured tool names
//! - check: compare local and remote versions (default)
//! - download: refresh artifacts in the package cache
//! - update: run install steps for outdated tools

use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

use toolsync::action::{ActionOptions, Verb};

/// Highest meaningful verbosity level
pub const MAX_VERBOSE: u8 = 3;

/// Keep third-party tools in sync with their upstream releases
#[derive(Parser, Debug)]
#[command(name = "toolsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short = 'g', long = "config-file")]
    pub config: Option<PathBuf>,

    /// Tools to process ("all" for every configured tool)
    #[arg(default_value = "all")]
    pub tools: Vec<String>,

    #[command(flatten)]
    pub mode: Mode,

    /// Force download or install
    #[arg(short, long)]
    pub force: bool,

    /// Do not show tools that are current
    #[arg(short, long = "skip-current")]
    pub skip_current: bool,

    /// Increase output detail (up to -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct Mode {
    /// List supported tools
    #[arg(short, long)]
    pub list: bool,

    /// Check for new versions (default)
    #[arg(short, long)]
    pub check: bool,

    /// Download new packages
    #[arg(short, long)]
    pub download: bool,

    /// Run install steps for new versions
    #[arg(short, long)]
    pub update: bool,
}

impl Cli {
    /// The verb to run; `None` for list mode
    pub fn verb(&self) -> Option<Verb> {
        if self.mode.list {
            None
        } else if self.mode.download {
            Some(Verb::Download)
        } else if self.mode.update {
            Some(Verb::Update)
        } else {
            Some(Verb::Check)
        }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose.min(MAX_VERBOSE)
    }

    pub fn action_options(&self) -> ActionOptions {
        ActionOptions {
            verbose: self.verbosity(),
            force: self.force,
            skip_current: self.skip_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["toolsync"]).unwrap();
        assert_eq!(cli.tools, vec!["all"]);
        assert_eq!(cli.verb(), Some(Verb::Check));
        assert!(cli.config.is_none());
        assert!(!cli.force);
        assert_eq!(cli.verbosity(), 0);
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["toolsync", "-g", "/path/to/tools.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/tools.yml")));
    }

    #[test]
    fn test_cli_tool_names() {
        let cli = Cli::try_parse_from(["toolsync", "-d", "fd", "ripgrep"]).unwrap();
        assert_eq!(cli.tools, vec!["fd", "ripgrep"]);
        assert_eq!(cli.verb(), Some(Verb::Download));
    }

    #[test]
    fn test_cli_list_mode() {
        let cli = Cli::try_parse_from(["toolsync", "--list"]).unwrap();
        assert_eq!(cli.verb(), None);
    }

    #[test]
    fn test_cli_update_with_modifiers() {
        let cli = Cli::try_parse_from(["toolsync", "-u", "-f", "-s", "helm"]).unwrap();
        assert_eq!(cli.verb(), Some(Verb::Update));
        let opts = cli.action_options();
        assert!(opts.force);
        assert!(opts.skip_current);
    }

    #[test]
    fn test_cli_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["toolsync", "-d", "-u"]).is_err());
        assert!(Cli::try_parse_from(["toolsync", "--list", "--check"]).is_err());
    }

    #[test]
    fn test_cli_verbose_is_capped() {
        let cli = Cli::try_parse_from(["toolsync", "-vvvvv"]).unwrap();
        assert_eq!(cli.verbose, 5);
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
