//! Message — the envelope every handler returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dto::Payload;
use crate::error::HandlerError;
use crate::template::{TemplateEngine, TemplateError};

/// Wire format of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "lowercase")]
pub enum MessageBody {
    Text(String),
    Json(Value),
    Html(String),
}

/// A handler result: a body plus the moment it was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    body: MessageBody,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(body: MessageBody) -> Self {
        Self {
            body,
            created_at: Utc::now(),
        }
    }

    /// Plain-text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(MessageBody::Text(body.into()))
    }

    /// JSON message.
    pub fn json(body: Value) -> Self {
        Self::new(MessageBody::Json(body))
    }

    /// Serialize any value into a JSON message.
    pub fn json_from<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        Ok(Self::json(serde_json::to_value(value)?))
    }

    /// HTML message.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(MessageBody::Html(body.into()))
    }

    /// Render a template through `engine` into an HTML message.
    pub fn render_template(
        engine: &dyn TemplateEngine,
        template: &str,
        vars: &Payload,
    ) -> Result<Self, TemplateError> {
        engine.render(template, vars).map(Self::html)
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn into_body(self) -> MessageBody {
        self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// MIME type matching the body format.
    pub fn content_type(&self) -> &'static str {
        match self.body {
            MessageBody::Text(_) => "text/plain; charset=utf-8",
            MessageBody::Json(_) => "application/json",
            MessageBody::Html(_) => "text/html; charset=utf-8",
        }
    }

    /// Render the body to its wire representation.
    pub fn render(&self) -> String {
        match &self.body {
            MessageBody::Text(text) | MessageBody::Html(text) => text.clone(),
            MessageBody::Json(value) => value.to_string(),
        }
    }
}
