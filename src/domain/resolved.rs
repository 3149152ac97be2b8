//! ResolvedTool - the per-run working state of one tool.
//!
//! A `ResolvedTool` is created fresh for every run, owned by the worker that
//! processes the tool, and handed back to the coordinator when the worker is
//! done. Nothing about it is persisted.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Defaults, ToolDefinition, VersionRule};
use crate::error::SyncError;
use crate::template::{expand_env, TemplateContext};

use super::package::PackageFormat;

/// Environment-expanded directories a tool works with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDirs {
    pub bin: PathBuf,
    pub opt: PathBuf,
    pub tmp: PathBuf,
    pub pkg: PathBuf,
}

impl ToolDirs {
    fn resolve(def: &ToolDefinition, defaults: &Defaults) -> Self {
        let pick = |over: &Option<String>, base: &str| {
            PathBuf::from(expand_env(over.as_deref().unwrap_or(base)))
        };
        Self {
            bin: pick(&def.bin_dir, &defaults.bin_dir),
            opt: pick(&def.opt_dir, &defaults.opt_dir),
            tmp: pick(&def.tmp_dir, &defaults.tmp_dir),
            pkg: pick(&def.pkg_dir, &defaults.pkg_dir),
        }
    }
}

/// Outcome of remote resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteRelease {
    pub version: Option<String>,
    pub published: Option<String>,
    pub package_url: String,
    pub package_name: String,
}

/// Working state of one tool during a run
#[derive(Debug)]
pub struct ResolvedTool {
    pub definition: ToolDefinition,
    pub name: String,
    pub dirs: ToolDirs,
    /// Effective version-detection rule
    pub ver: VersionRule,
    pub pkg_url: Option<String>,
    pub pkg_name: Option<String>,
    pub v_remote: Option<String>,
    pub v_remote_date: Option<String>,
    pub v_local: Option<String>,
    /// Package-cache entries whose name contains the tool name
    pub pkg_local: Vec<String>,
    pub format: PackageFormat,
    /// An artifact was downloaded during this run
    pub dl_ok: bool,
    pub outputs: Vec<String>,
    pub errors: Vec<SyncError>,
}

/// Serializable view of a tool for the most verbose output level
#[derive(Debug, Serialize)]
pub struct ToolSnapshot<'a> {
    pub name: &'a str,
    pub pkg_url: Option<&'a str>,
    pub pkg_name: Option<&'a str>,
    pub v_remote: Option<&'a str>,
    pub v_remote_date: Option<&'a str>,
    pub v_local: Option<&'a str>,
    pub pkg_local: &'a [String],
    pub is_rpm: bool,
    pub is_deb: bool,
    pub dl_ok: bool,
    pub dirs: &'a ToolDirs,
    pub ver: &'a VersionRule,
}

impl ResolvedTool {
    pub fn new(definition: ToolDefinition, defaults: &Defaults) -> Self {
        let ver = match &definition.ver {
            Some(partial) => defaults.ver.overlay(partial),
            None => defaults.ver.clone(),
        };
        Self {
            name: definition.name.clone(),
            dirs: ToolDirs::resolve(&definition, defaults),
            ver,
            definition,
            pkg_url: None,
            pkg_name: None,
            v_remote: None,
            v_remote_date: None,
            v_local: None,
            pkg_local: Vec::new(),
            format: PackageFormat::Other,
            dl_ok: false,
            outputs: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record the result of remote resolution and classify the artifact
    pub fn apply_remote(&mut self, release: RemoteRelease) {
        self.format = PackageFormat::classify(&release.package_name);
        self.v_remote = release.version;
        self.v_remote_date = release.published;
        self.pkg_url = Some(release.package_url);
        self.pkg_name = Some(release.package_name);
    }

    pub fn is_rpm(&self) -> bool {
        self.format.is_rpm()
    }

    pub fn is_deb(&self) -> bool {
        self.format.is_deb()
    }

    /// Whether remote resolution has completed
    pub fn is_resolved(&self) -> bool {
        self.pkg_name.is_some()
    }

    /// Path of the artifact inside the package cache
    pub fn package_path(&self) -> Option<PathBuf> {
        self.pkg_name.as_ref().map(|name| self.dirs.pkg.join(name))
    }

    pub fn push_output(&mut self, line: impl Into<String>) {
        self.outputs.push(line.into());
    }

    pub fn record_error(&mut self, error: SyncError) {
        log::warn!("Tool '{}': {}", self.name, error);
        self.errors.push(error);
    }

    /// Fields templates may reference right now.
    ///
    /// Remote fields appear once remote resolution has set them, the local
    /// version once local inspection found one.
    pub fn template_context(&self) -> TemplateContext {
        let def = &self.definition;
        let mut ctx = TemplateContext::new()
            .with("name", self.name.as_str())
            .with_opt("repo", def.repo.as_deref())
            .with_opt("url", def.url.as_deref())
            .with_opt("package", def.package.as_deref())
            .with_opt("tag", def.tag.as_deref())
            .with_opt("look_up", def.look_up.as_deref())
            .with("bin_dir", self.dirs.bin.to_string_lossy())
            .with("opt_dir", self.dirs.opt.to_string_lossy())
            .with("tmp_dir", self.dirs.tmp.to_string_lossy())
            .with("pkg_dir", self.dirs.pkg.to_string_lossy())
            .with_opt("pkg_url", self.pkg_url.as_deref())
            .with_opt("pkg_name", self.pkg_name.as_deref())
            .with_opt("v_remote", self.v_remote.as_deref())
            .with_opt("v_remote_date", self.v_remote_date.as_deref())
            .with_opt("v_local", self.v_local.as_deref());
        if self.is_resolved() {
            ctx = ctx.with_flag("is_rpm", self.is_rpm()).with_flag("is_deb", self.is_deb());
        }
        ctx
    }

    pub fn snapshot(&self) -> ToolSnapshot<'_> {
        ToolSnapshot {
            name: &self.name,
            pkg_url: self.pkg_url.as_deref(),
            pkg_name: self.pkg_name.as_deref(),
            v_remote: self.v_remote.as_deref(),
            v_remote_date: self.v_remote_date.as_deref(),
            v_local: self.v_local.as_deref(),
            pkg_local: &self.pkg_local,
            is_rpm: self.is_rpm(),
            is_deb: self.is_deb(),
            dl_ok: self.dl_ok,
            dirs: &self.dirs,
            ver: &self.ver,
        }
    }
}
