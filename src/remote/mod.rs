//! Remote metadata resolution.
//!
//! Every tool is resolved by exactly one of three variants, chosen by the
//! definition's `type`:
//! - `git`: release-hosting API (releases, tags or branches)
//! - `direct`: a (templated) download URL
//! - anything else: a vendor rule registered under the tool's name
//!
//! All variants produce a [`RemoteRelease`](crate::domain::RemoteRelease):
//! the package URL and file name, and the remote version when one can be
//! determined.

pub mod direct;
pub mod git;
pub mod http;
pub mod vendor;

#[cfg(test)]
pub(crate) mod test_server;

use crate::config::{Defaults, ToolKind};
use crate::domain::ResolvedTool;
use crate::error::{Result, SyncError};
use crate::template::TemplateRenderer;

pub use http::{HttpClient, RemoteFileInfo};
pub use vendor::{VendorPage, VendorRegistry, VendorRelease, VendorRule};

/// Shared, read-only collaborators for resolution
pub struct RemoteContext<'a> {
    pub http: &'a HttpClient,
    pub renderer: &'a TemplateRenderer,
    pub vendors: &'a VendorRegistry,
    pub defaults: &'a Defaults,
}

/// Resolve the remote side of a tool and record it on the tool
pub async fn resolve_remote(ctx: &RemoteContext<'_>, tool: &mut ResolvedTool) -> Result<()> {
    let release = match tool.definition.kind {
        ToolKind::Git => git::resolve(ctx, tool).await?,
        ToolKind::Direct => direct::resolve(ctx, tool).await?,
        ToolKind::Custom => vendor::resolve(ctx, tool).await?,
    };
    log::debug!(
        "Resolved {}: version={:?} package={}",
        tool.name,
        release.version,
        release.package_name
    );
    tool.apply_remote(release);
    Ok(())
}

/// Package file name: the rendered `package` template when configured,
/// otherwise the last path segment of the URL.
pub(crate) fn package_name_for(
    ctx: &RemoteContext<'_>,
    tool: &ResolvedTool,
    package_url: &str,
) -> Result<String> {
    match &tool.definition.package {
        Some(template) => ctx.renderer.render(template, &tool.template_context()),
        None => last_segment(package_url).ok_or_else(|| {
            SyncError::Resolution(format!("cannot derive a package name from '{}'", package_url))
        }),
    }
}

/// Last path segment of a URL, without query or fragment
pub fn last_segment(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(
            last_segment("https://example.com/dl/tool-1.0.rpm"),
            Some("tool-1.0.rpm".to_string())
        );
        assert_eq!(
            last_segment("https://example.com/dl/tool.tar.gz?sig=abc#frag"),
            Some("tool.tar.gz".to_string())
        );
        assert_eq!(last_segment("https://example.com/dl/"), None);
    }
}
