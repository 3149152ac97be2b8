//! Check: report whether the installed version trails the remote one.

use crate::domain::ResolvedTool;
use crate::template::TemplateRenderer;
use crate::version;

use super::{headline, ActionContext};

const SECTION: &str = "        ";
const BODY: &str = "            ";

pub fn check(ctx: &ActionContext<'_>, tool: &mut ResolvedTool) {
    let opts = ctx.options;
    let outdated = version::mismatch(tool.v_remote.as_deref(), tool.v_local.as_deref());
    let shown = outdated || !opts.skip_current;

    if shown {
        tool.push_output(headline(&tool.name, outdated));
    }
    if opts.verbose >= 2 {
        for line in describe(ctx.renderer, tool, opts.verbose) {
            tool.push_output(line);
        }
    }
    if shown && opts.verbose >= 1 {
        let lines = details(tool);
        for line in lines {
            tool.push_output(line);
        }
    }
}

fn details(tool: &ResolvedTool) -> Vec<String> {
    let show = |v: Option<&str>| v.unwrap_or("None").to_string();
    vec![
        format!("           remote name: {}", show(tool.pkg_name.as_deref())),
        format!("            remote url: {}", show(tool.pkg_url.as_deref())),
        format!("           remote date: {}", show(tool.v_remote_date.as_deref())),
        format!("        remote version: {}", show(tool.v_remote.as_deref())),
        format!("         local version: {}", show(tool.v_local.as_deref())),
        format!("        local packages: {:?}", tool.pkg_local),
    ]
}

/// Definition as configured and as rendered against the tool; at level 3
/// also the resolved tool state.
pub fn describe(renderer: &TemplateRenderer, tool: &ResolvedTool, verbose: u8) -> Vec<String> {
    let mut lines = Vec::new();
    let raw = match tool.definition.to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => format!("<{}>", e),
    };

    section(&mut lines, "Tool definition:", &raw);
    section(
        &mut lines,
        "Tool definition (rendered):",
        &render_or_note(renderer, tool, &raw),
    );

    if verbose >= 3 {
        let state = match serde_yaml::to_string(&tool.snapshot()) {
            Ok(yaml) => yaml,
            Err(e) => format!("<{}>", e),
        };
        section(
            &mut lines,
            "Tool object attributes (rendered):",
            &render_or_note(renderer, tool, &state),
        );
    }
    lines
}

fn render_or_note(renderer: &TemplateRenderer, tool: &ResolvedTool, text: &str) -> String {
    renderer
        .render(text, &tool.template_context())
        .unwrap_or_else(|e| format!("{}\n<{}>", text.trim_end(), e))
}

fn section(lines: &mut Vec<String>, title: &str, body: &str) {
    lines.push(format!("{}{}", SECTION, title));
    lines.extend(body.lines().map(|l| format!("{}{}", BODY, l)));
    lines.push(String::new());
}
