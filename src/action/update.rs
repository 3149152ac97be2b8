//! Update: run the tool's install steps.
//!
//! RPM and DEB artifacts are installed by the system package manager from
//! the refreshed repository, so they are only updated here when forced.

use colored::Colorize;

use crate::command::CommandSpec;
use crate::domain::{PackageFormat, ResolvedTool};
use crate::error::{Result, SyncError};
use crate::template::expand_env;
use crate::version;

use super::{headline, ActionContext};

pub fn should_update(force: bool, format: PackageFormat, mismatch: bool) -> bool {
    force || (!format.is_system_package() && mismatch)
}

pub async fn update(ctx: &ActionContext<'_>, tool: &mut ResolvedTool) -> Result<()> {
    let opts = ctx.options;
    let mismatch = version::mismatch(tool.v_remote.as_deref(), tool.v_local.as_deref());
    let triggered = should_update(opts.force, tool.format, mismatch);
    let pkg_name = tool.pkg_name.clone().unwrap_or_default();

    if triggered {
        tool.push_output(headline(&tool.name, true));
        if opts.force && opts.verbose >= 2 {
            tool.push_output("        Update forced");
        }
    } else if !opts.skip_current {
        tool.push_output(headline(&tool.name, false));
    }

    if opts.verbose >= 2 {
        if triggered {
            tool.push_output(format!("        Updating: {}", pkg_name));
        } else {
            tool.push_output(format!("        Not updating: {}", pkg_name));
            tool.push_output(format!("        RPM package: {}", tool.is_rpm()));
            tool.push_output(format!("        DEB package: {}", tool.is_deb()));
        }
    }

    if triggered {
        run_steps(ctx, tool).await?;
    }
    Ok(())
}

async fn run_steps(ctx: &ActionContext<'_>, tool: &mut ResolvedTool) -> Result<()> {
    let steps = tool.definition.inst.clone();
    let total = steps.len();

    for (index, step) in steps.iter().enumerate() {
        let count = index + 1;
        let line = ctx
            .renderer
            .render(&expand_env(step), &tool.template_context())?;
        if ctx.options.verbose >= 2 {
            tool.push_output(format!("           Step {}/{}: {}", count, total, line));
        }

        let output = CommandSpec::parse(&line)?.run().await?;
        if !output.success {
            log::debug!(
                "Step {}/{} of {} failed: {}",
                count,
                total,
                tool.name,
                output.stderr_text().trim()
            );
            return Err(SyncError::InstallStep {
                step: count,
                total,
                command: line,
            });
        }
        if ctx.options.verbose >= 1 {
            let done = format!("           Step {}/{}: completed.", count, total);
            tool.push_output(done.green().to_string());
        }
    }
    Ok(())
}
