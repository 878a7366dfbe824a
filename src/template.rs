//! Template engine collaborator.
//!
//! Templates use `{{key}}` placeholders. Substitution is literal: values
//! are inserted as-is (no escaping), and placeholders with no matching key
//! are left untouched.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::dto::Payload;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders a template reference with a set of variables.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, vars: &Payload) -> Result<String, TemplateError>;
}

/// Replace every `{{key}}` in `body` with the matching value from `vars`.
///
/// Strings are inserted verbatim; other JSON values use their compact JSON
/// form.
pub fn substitute(body: &str, vars: &Payload) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after_open[..end];
        match vars.get(key) {
            Some(Value::String(s)) => out.push_str(s),
            Some(other) => out.push_str(&other.to_string()),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Treats the template reference as the template body itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTemplates;

impl TemplateEngine for InlineTemplates {
    fn render(&self, template: &str, vars: &Payload) -> Result<String, TemplateError> {
        Ok(substitute(template, vars))
    }
}

/// Loads templates from files under a root directory.
#[derive(Debug, Clone)]
pub struct FileTemplates {
    root: PathBuf,
}

impl FileTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateEngine for FileTemplates {
    fn render(&self, template: &str, vars: &Payload) -> Result<String, TemplateError> {
        let path = self.root.join(template);
        let body = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(template = %path.display(), "rendering template");
        Ok(substitute(&body, vars))
    }
}
