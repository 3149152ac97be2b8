//! Release-hosting API variant.
//!
//! Resolves a tool from the releases, tags or branches of a repository on
//! the GitHub API. Selection keeps the order the API returns; nothing is
//! re-sorted.

use log::debug;
use serde::Deserialize;

use crate::config::{Defaults, ToolDefinition};
use crate::domain::{RemoteRelease, ResolvedTool};
use crate::error::{Result, SyncError};
use crate::version::strip_v;

use super::vendor::VendorPage;
use super::{package_name_for, RemoteContext};

/// A release as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// A tag or branch entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GitRef {
    pub name: String,
}

/// What part of the repository is searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    Releases,
    Tags,
    Branches,
}

impl LookupMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "releases" => Ok(LookupMode::Releases),
            "tags" => Ok(LookupMode::Tags),
            "branches" => Ok(LookupMode::Branches),
            other => Err(SyncError::UnknownLookup(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LookupMode::Releases => "releases",
            LookupMode::Tags => "tags",
            LookupMode::Branches => "branches",
        }
    }
}

/// How a tag or branch name is matched against the selector.
///
/// `^x` anchors at the start, `x$` at the end, `^x$` requires equality,
/// anything else is a substring match. `latest` takes the first entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefSelector {
    First,
    Contains(String),
    Prefix(String),
    Suffix(String),
    Exact(String),
}

impl RefSelector {
    pub fn parse(selector: &str) -> Self {
        if selector == "latest" {
            return RefSelector::First;
        }
        match (selector.strip_prefix('^'), selector.strip_suffix('$')) {
            (Some(_), Some(_)) if selector.len() >= 2 => {
                RefSelector::Exact(selector[1..selector.len() - 1].to_string())
            }
            (Some(rest), None) => RefSelector::Prefix(rest.to_string()),
            (None, Some(rest)) => RefSelector::Suffix(rest.to_string()),
            _ => RefSelector::Contains(selector.to_string()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            RefSelector::First => true,
            RefSelector::Contains(s) => name.contains(s.as_str()),
            RefSelector::Prefix(s) => name.starts_with(s.as_str()),
            RefSelector::Suffix(s) => name.ends_with(s.as_str()),
            RefSelector::Exact(s) => name == s,
        }
    }
}

/// Fully-defaulted git source parameters
#[derive(Debug, Clone)]
pub struct GitSource {
    pub api: String,
    pub repo: String,
    pub lookup: LookupMode,
    pub tag: String,
    pub custom: bool,
    pub token_env: String,
}

impl GitSource {
    pub fn from_definition(def: &ToolDefinition, defaults: &Defaults) -> Result<Self> {
        let repo = def
            .repo
            .clone()
            .ok_or_else(|| SyncError::Config(format!("tool '{}' has no 'repo'", def.name)))?;
        let look_up = def.look_up.as_deref().unwrap_or(&defaults.git.look_up);
        Ok(Self {
            api: defaults.git.api.trim_end_matches('/').to_string(),
            repo,
            lookup: LookupMode::parse(look_up)?,
            tag: def.tag.clone().unwrap_or_else(|| defaults.git.tag.clone()),
            custom: def
                .custom
                .as_ref()
                .map(|f| f.is_set())
                .unwrap_or(defaults.git.custom),
            token_env: defaults.git.token_env.clone(),
        })
    }

    /// Endpoint queried for this source
    pub fn api_url(&self) -> String {
        if self.lookup == LookupMode::Releases && self.tag == "latest" {
            format!("{}/{}/releases/latest", self.api, self.repo)
        } else {
            format!("{}/{}/{}", self.api, self.repo, self.lookup.as_str())
        }
    }

    /// Page handed to a vendor rule when asset resolution is custom
    pub fn vendor_url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api,
            self.repo,
            self.lookup.as_str(),
            self.tag
        )
    }

    fn token(&self) -> Option<String> {
        if self.token_env.is_empty() {
            return None;
        }
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}

/// First release whose tag contains `tag` and none of `not_tags`
pub fn select_release(releases: Vec<Release>, tag: &str, not_tags: &[String]) -> Result<Release> {
    releases
        .into_iter()
        .filter(|r| !not_tags.iter().any(|n| r.tag_name.contains(n.as_str())))
        .find(|r| r.tag_name.contains(tag))
        .ok_or_else(|| SyncError::Resolution(format!("no release tag matches '{}'", tag)))
}

/// First tag or branch accepted by the selector
pub fn select_ref<'a>(refs: &'a [GitRef], selector: &str) -> Result<&'a GitRef> {
    let selector_rule = RefSelector::parse(selector);
    refs.iter()
        .find(|r| selector_rule.matches(&r.name))
        .ok_or_else(|| SyncError::Resolution(format!("no tag or branch matches '{}'", selector)))
}

/// Assets containing every `incl` substring and no `excl` substring
pub fn filter_assets(assets: Vec<Asset>, incl: &[String], excl: &[String]) -> Vec<Asset> {
    assets
        .into_iter()
        .filter(|a| incl.iter().all(|i| a.name.contains(i.as_str())))
        .filter(|a| !excl.iter().any(|e| a.name.contains(e.as_str())))
        .collect()
}

/// The single asset left after filtering
pub fn pick_asset(mut assets: Vec<Asset>) -> Result<Asset> {
    match assets.len() {
        0 => Err(SyncError::NoAsset),
        1 => Ok(assets.remove(0)),
        _ => Err(SyncError::AmbiguousAsset(
            assets.into_iter().map(|a| a.name).collect(),
        )),
    }
}

/// Resolve a git-type tool
pub async fn resolve(ctx: &RemoteContext<'_>, tool: &mut ResolvedTool) -> Result<RemoteRelease> {
    let source = GitSource::from_definition(&tool.definition, ctx.defaults)?;
    let token = source.token();
    let url = source.api_url();
    debug!("Resolving {} from {}", tool.name, url);

    let assets = match source.lookup {
        LookupMode::Releases if source.tag == "latest" => {
            let release: Release = ctx.http.get_json(&url, token.as_deref()).await?;
            tool.v_remote = Some(strip_v(&release.tag_name).to_string());
            tool.v_remote_date = release.published_at;
            release.assets
        }
        LookupMode::Releases => {
            let releases: Vec<Release> = ctx.http.get_json(&url, token.as_deref()).await?;
            let release = select_release(releases, &source.tag, &tool.definition.not_tags)?;
            tool.v_remote = Some(strip_v(&release.tag_name).to_string());
            tool.v_remote_date = release.published_at;
            release.assets
        }
        LookupMode::Tags | LookupMode::Branches => {
            let refs: Vec<GitRef> = ctx.http.get_json(&url, token.as_deref()).await?;
            let selected = select_ref(&refs, &source.tag)?;
            tool.v_remote = Some(strip_v(&selected.name).to_string());
            Vec::new()
        }
    };

    let (package_url, package_name) = if source.custom {
        let vendor_url = source.vendor_url();
        let rule = ctx.vendors.get(&tool.name)?;
        let page = VendorPage {
            url: &vendor_url,
            package: tool.definition.package.as_deref(),
        };
        let found = rule.resolve(ctx.http, &page).await?;
        let name = match found.package_name {
            Some(name) => name,
            None => package_name_for(ctx, tool, &found.package_url)?,
        };
        (found.package_url, name)
    } else if let Some(url_template) = tool.definition.url.clone() {
        let package_url = ctx.renderer.render(&url_template, &tool.template_context())?;
        let package_name = package_name_for(ctx, tool, &package_url)?;
        (package_url, package_name)
    } else {
        let def = &tool.definition;
        let asset = pick_asset(filter_assets(assets, &def.incl, &def.excl))?;
        (asset.browser_download_url, asset.name)
    };

    Ok(RemoteRelease {
        version: tool.v_remote.clone(),
        published: tool.v_remote_date.clone(),
        package_url,
        package_name,
    })
}
