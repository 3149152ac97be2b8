//! Direct-URL variant.
//!
//! The package URL comes straight from the definition. The remote version is
//! read from the package metadata for RPM/DEB artifacts, or scraped from the
//! optional `ver_remote` page for everything else.

use log::debug;
use regex::Regex;

use crate::domain::{PackageFormat, RemoteRelease, ResolvedTool};
use crate::error::{Result, SyncError};
use crate::local::package_db;
use crate::version;

use super::{package_name_for, RemoteContext};

pub async fn resolve(ctx: &RemoteContext<'_>, tool: &mut ResolvedTool) -> Result<RemoteRelease> {
    let template = tool
        .definition
        .url
        .clone()
        .ok_or_else(|| SyncError::Config(format!("tool '{}' has no 'url'", tool.name)))?;
    let package_url = ctx.renderer.render(&template, &tool.template_context())?;
    let package_name = package_name_for(ctx, tool, &package_url)?;

    let version = match PackageFormat::classify(&package_name) {
        PackageFormat::Rpm => package_db::rpm_file_field(&package_url, "VERSION").await?,
        PackageFormat::Deb => deb_remote_version(ctx, tool, &package_url, &package_name).await?,
        PackageFormat::Other => match &tool.definition.ver_remote {
            Some(page) => {
                let pattern = Regex::new(&page.regex)?;
                let body = ctx.http.get_text(&page.url).await?;
                let found = version::extract(&pattern, &body);
                if found.is_none() {
                    return Err(SyncError::Resolution(format!(
                        "'{}' not found on {}",
                        page.regex, page.url
                    )));
                }
                found
            }
            None => None,
        },
    };

    Ok(RemoteRelease {
        version,
        published: None,
        package_url,
        package_name,
    })
}

/// `dpkg` cannot read a URL, so the archive is fetched into the temp dir,
/// inspected and removed again.
async fn deb_remote_version(
    ctx: &RemoteContext<'_>,
    tool: &ResolvedTool,
    package_url: &str,
    package_name: &str,
) -> Result<Option<String>> {
    let path = ctx.http.download(package_url, &tool.dirs.tmp, package_name).await?;
    debug!("Inspecting {}", path.display());
    let result = package_db::deb_file_version(&path).await;
    if let Err(e) = tokio::fs::remove_file(&path).await {
        log::warn!("Failed to remove {}: {}", path.display(), e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Defaults, ToolDefinition, ToolKind};
    use crate::remote::{HttpClient, VendorRegistry};
    use crate::template::TemplateRenderer;

    fn direct(name: &str, url: &str) -> ToolDefinition {
        let mut def = ToolDefinition::new(name, ToolKind::Direct);
        def.url = Some(url.to_string());
        def
    }

    #[tokio::test]
    async fn test_resolve_archive_without_version_page() {
        let http = HttpClient::new().unwrap();
        let renderer = TemplateRenderer::new();
        let vendors = VendorRegistry::new();
        let defaults = Defaults::default();
        let ctx = RemoteContext {
            http: &http,
            renderer: &renderer,
            vendors: &vendors,
            defaults: &defaults,
        };

        let mut tool = ResolvedTool::new(
            direct("kubectl", "https://dl.example.com/{{tool.name}}/linux/{{tool.name}}.tar.gz"),
            &defaults,
        );
        let release = resolve(&ctx, &mut tool).await.unwrap();
        assert_eq!(release.package_url, "https://dl.example.com/kubectl/linux/kubectl.tar.gz");
        assert_eq!(release.package_name, "kubectl.tar.gz");
        assert!(release.version.is_none());
    }

    #[tokio::test]
    async fn test_resolve_package_template() {
        let http = HttpClient::new().unwrap();
        let renderer = TemplateRenderer::new();
        let vendors = VendorRegistry::new();
        let defaults = Defaults::default();
        let ctx = RemoteContext {
            http: &http,
            renderer: &renderer,
            vendors: &vendors,
            defaults: &defaults,
        };

        let mut def = direct("terraform", "https://dl.example.com/latest?os=linux");
        def.package = Some("{{tool.name}}-linux.zip".to_string());
        let mut tool = ResolvedTool::new(def, &defaults);
        let release = resolve(&ctx, &mut tool).await.unwrap();
        assert_eq!(release.package_name, "terraform-linux.zip");
    }

    #[tokio::test]
    async fn test_resolve_unresolved_placeholder_is_error() {
        let http = HttpClient::new().unwrap();
        let renderer = TemplateRenderer::new();
        let vendors = VendorRegistry::new();
        let defaults = Defaults::default();
        let ctx = RemoteContext {
            http: &http,
            renderer: &renderer,
            vendors: &vendors,
            defaults: &defaults,
        };

        let def = direct("x", "https://x/{{tool.v_remote}}/x.tgz");
        let mut tool = ResolvedTool::new(def, &defaults);
        assert!(matches!(resolve(&ctx, &mut tool).await, Err(SyncError::Template(_))));
    }
}
