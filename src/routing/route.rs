//! Route table — method + path pattern → handler id and middleware ids.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Method wildcard.
pub const ANY_METHOD: &str = "ANY";

/// One entry of the route configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    #[serde(default = "any_method")]
    pub method: String,
    pub path: String,
    pub handler: String,
    #[serde(default)]
    pub middleware: Vec<String>,
}

fn any_method() -> String {
    ANY_METHOD.to_string()
}

impl RouteDefinition {
    pub fn new(method: &str, path: &str, handler: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            handler: handler.to_string(),
            middleware: Vec::new(),
        }
    }

    /// Append a middleware id. Builder pattern.
    pub fn with_middleware(mut self, id: &str) -> Self {
        self.middleware.push(id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed path pattern: `/users/{id}/posts`, `/static/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    wildcard: bool,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl PathPattern {
    pub fn parse(pattern: &str) -> DispatchResult<Self> {
        let invalid = |reason: &str| DispatchError::Config(format!("route `{pattern}`: {reason}"));

        if !pattern.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let parts: Vec<&str> = split(pattern).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut wildcard = false;

        for (index, part) in parts.iter().enumerate() {
            if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(invalid("`*` is only allowed as the last segment"));
                }
                wildcard = true;
            } else if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains(['{', '}', '*']) {
                return Err(invalid("malformed segment"));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            wildcard,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Captured parameters when `path` matches. A trailing wildcard captures
    /// the remainder under `*`. Segments are percent-decoded before matching.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<String> = split(path)
            .map(|part| percent_decode_str(part).decode_utf8_lossy().into_owned())
            .collect();
        if parts.len() < self.segments.len() {
            return None;
        }
        if !self.wildcard && parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.clone());
                }
            }
        }

        if self.wildcard {
            params.insert("*".to_string(), parts[self.segments.len()..].join("/"));
        }
        Some(params)
    }

    fn is_exact(&self) -> bool {
        !self.wildcard && self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Ordering key; greater is more specific.
    fn specificity(&self) -> (bool, usize, usize, bool) {
        (
            self.is_exact(),
            self.literal_count(),
            self.segments.len(),
            !self.wildcard,
        )
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    method: String,
    pattern: PathPattern,
    handler: String,
    middleware: Vec<String>,
}

impl Route {
    pub fn compile(definition: &RouteDefinition) -> DispatchResult<Self> {
        Ok(Self {
            method: definition.method.to_ascii_uppercase(),
            pattern: PathPattern::parse(&definition.path)?,
            handler: definition.handler.clone(),
            middleware: definition.middleware.clone(),
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Route handler id.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Middleware ids, outermost first.
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    fn accepts(&self, method: &str) -> bool {
        self.method == ANY_METHOD || self.method.eq_ignore_ascii_case(method)
    }
}

/// A matched route plus its captured path parameters.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: BTreeMap<String, String>,
}

/// Immutable set of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(definitions: &[RouteDefinition]) -> DispatchResult<Self> {
        let routes = definitions
            .iter()
            .map(Route::compile)
            .collect::<DispatchResult<Vec<_>>>()?;
        Ok(Self { routes })
    }

    /// Most specific route for `method` + `path`; declaration order breaks ties.
    pub fn find(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        let mut best: Option<RouteMatch<'_>> = None;

        for route in self.routes.iter().filter(|r| r.accepts(method)) {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    route.pattern.specificity().cmp(&current.route.pattern.specificity())
                        == Ordering::Greater
                }
            };
            if better {
                best = Some(RouteMatch { route, params });
            }
        }

        best
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
