//! Subject line templates.
//!
//! Templates use field-substitution syntax: `{{.Name}}` for the recipient
//! name and `{{.Content.key}}` (nested as deep as the data goes) for entries
//! of the content map. Rendering is strict: a reference to a key that is not
//! present fails instead of producing an empty string.
//!
//! Strings are substituted verbatim, numbers and booleans as their JSON text.
//! Nothing is HTML-escaped since subjects are plain text.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

const SUBJECT: &str = "subject";

/// Matches `{{.Field}}` and `{{ .Field.nested }}`.
static FIELD_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*\}\}")
        .expect("field reference pattern is valid")
});

/// Data a subject template is rendered against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    /// Recipient name, referenced as `{{.Name}}`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Free-form values, referenced as `{{.Content.key}}`.
    #[serde(rename = "Content", default)]
    pub content: Map<String, Value>,
}

impl MessageData {
    /// Create data for a named recipient with no content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Map::new(),
        }
    }

    /// Add a content entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }

    /// Look up a content entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }
}

/// A compiled subject template.
pub struct SubjectTemplate {
    registry: Handlebars<'static>,
    source: String,
}

impl SubjectTemplate {
    /// Compile a template, failing on syntax errors.
    pub fn compile(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(SUBJECT, translate(source))?;

        Ok(Self {
            registry,
            source: source.to_string(),
        })
    }

    /// Render against message data.
    pub fn render(&self, data: &MessageData) -> Result<String> {
        Ok(self.registry.render(SUBJECT, data)?)
    }

    /// The template as written.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for SubjectTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectTemplate")
            .field("source", &self.source)
            .finish()
    }
}

/// Compile and render in one step.
pub fn render_subject(source: &str, data: &MessageData) -> Result<String> {
    SubjectTemplate::compile(source)?.render(data)
}

/// Rewrite `{{.A.b}}` references into handlebars paths `{{A.b}}`.
fn translate(source: &str) -> String {
    FIELD_REFERENCE.replace_all(source, "{{$1}}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_translate() {
        assert_eq!(translate("Hi {{.Name}}"), "Hi {{Name}}");
        assert_eq!(translate("{{ .Content.order.id }}"), "{{Content.order.id}}");
        assert_eq!(translate("no fields"), "no fields");
    }

    #[test]
    fn test_render_name() {
        let subject = render_subject("Welcome, {{.Name}}!", &MessageData::new("Ada")).unwrap();
        assert_eq!(subject, "Welcome, Ada!");
    }

    #[test]
    fn test_render_content_values() {
        let data = MessageData::new("Ada")
            .with("order", json!({"id": 1042}))
            .with("total", 19.5)
            .with("express", true)
            .with("shop", "Analytical Engines");

        let subject = render_subject(
            "{{.Content.shop}}: order #{{.Content.order.id}} ({{.Content.total}}, express={{.Content.express}})",
            &data,
        )
        .unwrap();

        assert_eq!(subject, "Analytical Engines: order #1042 (19.5, express=true)");
    }

    #[test]
    fn test_no_html_escaping() {
        let data = MessageData::new("Tom & Jerry <friends>");
        let subject = render_subject("Hello {{.Name}}", &data).unwrap();
        assert_eq!(subject, "Hello Tom & Jerry <friends>");
    }

    #[test]
    fn test_missing_field_fails() {
        let data = MessageData::new("Ada").with("order", json!({"id": 1}));

        let err = render_subject("{{.Content.invoice}}", &data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);

        let err = render_subject("{{.Content.order.missing}}", &data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
    }

    #[test]
    fn test_syntax_error_fails_at_compile() {
        let err = SubjectTemplate::compile("Hello {{#if}}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
    }

    #[test]
    fn test_compiled_template_reusable() {
        let template = SubjectTemplate::compile("Hi {{.Name}}").unwrap();
        assert_eq!(template.source(), "Hi {{.Name}}");
        assert_eq!(template.render(&MessageData::new("Ada")).unwrap(), "Hi Ada");
        assert_eq!(template.render(&MessageData::new("Grace")).unwrap(), "Hi Grace");
    }

    #[test]
    fn test_data_serializes_with_field_names() {
        let value = serde_json::to_value(MessageData::new("Ada").with("k", "v")).unwrap();
        assert_eq!(value, json!({"Name": "Ada", "Content": {"k": "v"}}));
    }
}
