//! Inbound HTTP request as seen by the router.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dto::Payload;
use crate::error::HandlerError;

/// Method, path, headers, query string, captured path params and body.
///
/// Header names are stored lowercased. Methods are stored uppercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Request {
    /// Build a request. `target` may carry a `?query` suffix.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, BTreeMap::new()),
        };
        Self {
            method: method.to_ascii_uppercase(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn with_json(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// A path parameter captured by the matched route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub(crate) fn set_params(&mut self, params: BTreeMap<String, String>) {
        self.params = params;
    }

    /// Value of a cookie from the `cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie").and_then(|header| find_cookie(header, name))
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Merge query parameters, a JSON-object body and path params into one
    /// payload. Later sources win: query < body < path params.
    pub fn payload(&self) -> Result<Payload, HandlerError> {
        let mut payload: Payload = self
            .query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        if !self.body.is_empty() {
            match serde_json::from_slice::<Value>(&self.body)? {
                Value::Object(map) => payload.extend(map),
                _ => {
                    return Err(HandlerError::DecodeFailed(
                        "request body must be a JSON object".into(),
                    ))
                }
            }
        }

        payload.extend(
            self.params
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone()))),
        );
        Ok(payload)
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
fn parse_query(query: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Find a cookie value in a `cookie` header value.
pub(crate) fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}
