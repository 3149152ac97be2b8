//! Action execution: the three verbs a run can perform on a resolved tool.
//!
//! Every verb appends its report to the tool's output buffer. The first
//! line is the tool name, highlighted when the verb found something to do.

pub mod check;
pub mod download;
pub mod update;

use colored::Colorize;

use crate::domain::ResolvedTool;
use crate::error::Result;
use crate::remote::HttpClient;
use crate::template::TemplateRenderer;

pub use download::{DownloadTrigger, LocalFile};

/// The verb requested for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verb {
    #[default]
    Check,
    Download,
    Update,
}

/// Flags shared by all verbs
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionOptions {
    /// 0 (names only) to 3 (full tool state)
    pub verbose: u8,
    pub force: bool,
    /// Omit tools with nothing to do
    pub skip_current: bool,
}

/// Collaborators a verb may need
pub struct ActionContext<'a> {
    pub http: &'a HttpClient,
    pub renderer: &'a TemplateRenderer,
    pub options: ActionOptions,
}

/// Run `verb` against a tool whose remote and local state are known
pub async fn perform(verb: Verb, ctx: &ActionContext<'_>, tool: &mut ResolvedTool) -> Result<()> {
    match verb {
        Verb::Check => {
            check::check(ctx, tool);
            Ok(())
        }
        Verb::Download => download::download(ctx, tool).await,
        Verb::Update => update::update(ctx, tool).await,
    }
}

pub(crate) fn headline(name: &str, highlight: bool) -> String {
    let line = format!("    {}", name);
    if highlight {
        line.yellow().to_string()
    } else {
        line
    }
}
