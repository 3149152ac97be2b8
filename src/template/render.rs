//! Template Renderer - Render tool templates using Handlebars
//!
//! Templates in tool definitions reference tool attributes as
//! `{{ tool.<field> }}`. The renderer runs in strict mode so a reference to a
//! field that has not been resolved yet is an error instead of an empty
//! string.

use handlebars::Handlebars;
use serde_json::{Map, Value};

use crate::error::{Result, SyncError};

/// Read-only view over the fields of a tool that templates may reference.
///
/// Only fields that are known at the time of rendering are present.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    fields: Map<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string field
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Set a string field when a value is present
    pub fn with_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Set a boolean field
    pub fn with_flag(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn to_json(&self) -> Value {
        serde_json::json!({ "tool": Value::Object(self.fields.clone()) })
    }
}

/// Renders tool templates using Handlebars templating
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new TemplateRenderer with strict variable lookup
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // URLs and shell commands must come out verbatim
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render a template string against a tool context
    pub fn render(&self, template: &str, context: &TemplateContext) -> Result<String> {
        self.handlebars
            .render_template(template, &context.to_json())
            .map_err(|e| SyncError::Template(format!("'{}': {}", template, e)))
    }
}
