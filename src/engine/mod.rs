//! Batch engine: processes many tools concurrently.
//!
//! Tools are dispatched in name order to a bounded pool of tokio tasks. Each
//! task owns its `ResolvedTool` from creation to completion; the only shared
//! state is read-only (defaults, HTTP client, renderer, vendor rules). A
//! failure in one tool, including a panic, is recorded under that tool's
//! name and never affects the others.

mod report;

use futures::FutureExt;
use log::{debug, info};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::action::{self, ActionContext, ActionOptions, Verb};
use crate::config::{Defaults, ToolDefinition};
use crate::domain::ResolvedTool;
use crate::error::{Result, SyncError};
use crate::local;
use crate::remote::{self, HttpClient, RemoteContext, VendorRegistry};
use crate::repo::{RepositoryRefresher, REPO_UPDATE};
use crate::template::{expand_env, TemplateRenderer};

pub use report::{BatchEvent, BatchReport};

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 32;

/// `min(32, cpus + 4)`
pub fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    MAX_DEFAULT_WORKERS.min(cpus + 4)
}

struct Shared {
    http: HttpClient,
    renderer: TemplateRenderer,
    vendors: VendorRegistry,
    defaults: Defaults,
    verb: Verb,
    options: ActionOptions,
}

pub struct Engine {
    shared: Arc<Shared>,
    workers: usize,
    refresh_repo: bool,
}

impl Engine {
    pub fn new(defaults: Defaults, verb: Verb, options: ActionOptions) -> Result<Self> {
        Ok(Self {
            shared: Arc::new(Shared {
                http: HttpClient::new()?,
                renderer: TemplateRenderer::new(),
                vendors: VendorRegistry::builtin(),
                defaults,
                verb,
                options,
            }),
            workers: default_workers(),
            refresh_repo: true,
        })
    }

    /// Replace the vendor rules
    pub fn with_vendors(mut self, vendors: VendorRegistry) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.vendors = vendors;
        }
        self
    }

    /// Set the worker count; zero means the default
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { default_workers() } else { workers };
        self
    }

    /// Skip the repository refresh even when packages were downloaded
    pub fn without_refresh(mut self) -> Self {
        self.refresh_repo = false;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every definition and report as tools complete.
    ///
    /// `observe` sees each finished tool exactly once, in completion order,
    /// before its errors are moved into the report.
    pub async fn run<F>(
        &self,
        mut definitions: Vec<ToolDefinition>,
        mut observe: F,
    ) -> BatchReport
    where
        F: FnMut(BatchEvent<'_>),
    {
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        info!(
            "Processing {} tools with {} workers ({:?})",
            definitions.len(),
            self.workers,
            self.shared.verb
        );

        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let mut join_set = JoinSet::new();

        for definition in definitions {
            let shared = Arc::clone(&self.shared);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire().await;
                let name = definition.name.clone();
                let outcome = AssertUnwindSafe(process_tool(&shared, definition))
                    .catch_unwind()
                    .await
                    .map_err(|panic| panic_message(panic.as_ref()));
                (name, outcome)
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(mut tool))) => {
                    observe(BatchEvent::ToolDone(&tool));
                    report.absorb(&mut tool);
                }
                Ok((name, Err(message))) => {
                    report.processed += 1;
                    report.errors.push((name, SyncError::Worker(message)));
                }
                Err(e) => {
                    let error = SyncError::Worker(e.to_string());
                    report.errors.push(("<unknown>".to_string(), error));
                }
            }
        }

        if report.packages_downloaded && self.refresh_repo {
            let dir = PathBuf::from(expand_env(&self.shared.defaults.pkg_dir));
            observe(BatchEvent::RefreshStarted(&dir));
            let refresher = RepositoryRefresher::new(dir.clone());
            for error in refresher.refresh().await {
                report.errors.push((REPO_UPDATE.to_string(), error));
            }
            report.refreshed = Some(dir);
        }

        debug!(
            "Batch done: {} processed, {} errors",
            report.processed,
            report.errors.len()
        );
        report
    }
}

/// Remote resolution, local inspection, then the requested verb.
///
/// Only a remote failure ends processing early. A local failure is recorded
/// and the verb still runs with no local version or cached packages.
async fn process_tool(shared: &Shared, definition: ToolDefinition) -> ResolvedTool {
    let mut tool = ResolvedTool::new(definition, &shared.defaults);

    let remote_ctx = RemoteContext {
        http: &shared.http,
        renderer: &shared.renderer,
        vendors: &shared.vendors,
        defaults: &shared.defaults,
    };
    if let Err(e) = remote::resolve_remote(&remote_ctx, &mut tool).await {
        tool.record_error(e);
        return tool;
    }

    match local::resolve_local(&shared.renderer, &tool).await {
        Ok(state) => {
            tool.v_local = state.version;
            tool.pkg_local = state.matching_files;
        }
        Err(e) => {
            debug!("Local state of {} unavailable: {}", tool.name, e);
            tool.record_error(e);
        }
    }

    let ctx = ActionContext {
        http: &shared.http,
        renderer: &shared.renderer,
        options: shared.options,
    };
    if let Err(e) = action::perform(shared.verb, &ctx, &mut tool).await {
        tool.record_error(e);
    }
    tool
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
