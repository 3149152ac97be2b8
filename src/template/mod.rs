//! Template System - placeholder and environment expansion
//!
//! Tool definitions carry templates for URLs, package names, version
//! commands and install steps. This module renders them against a tool's
//! resolved-so-far fields and expands environment references.

mod env;
mod render;

pub use env::expand_env;
pub use render::{TemplateContext, TemplateRenderer};
