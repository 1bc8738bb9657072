/* src/core/rust/src/route.rs */

//! Route Table and Route Matcher.
//!
//! Patterns are `/`-separated segments where `:name` captures any non-empty
//! segment. Routes are tried in declaration order and the first match wins,
//! so route order is part of the table's meaning. A non-exact route matches
//! any path its segments are a prefix of.

use std::collections::BTreeMap;

use crate::errors::{Result, TandemError};

pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Static(String),
  Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
  pattern: String,
  segments: Vec<Segment>,
  exact: bool,
  view: String,
  fetcher: Option<String>,
}

impl Route {
  /// Compile a pattern. Routes default to prefix matching.
  pub fn new(pattern: impl Into<String>, view: impl Into<String>) -> Result<Self> {
    let pattern = pattern.into();
    let segments = compile(&pattern)?;
    Ok(Self { pattern, segments, exact: false, view: view.into(), fetcher: None })
  }

  #[must_use]
  pub fn exact(mut self, exact: bool) -> Self {
    self.exact = exact;
    self
  }

  #[must_use]
  pub fn fetcher(mut self, name: impl Into<String>) -> Self {
    self.fetcher = Some(name.into());
    self
  }

  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  pub fn is_exact(&self) -> bool {
    self.exact
  }

  pub fn view_id(&self) -> &str {
    &self.view
  }

  pub fn fetcher_name(&self) -> Option<&str> {
    self.fetcher.as_deref()
  }

  /// Names of the captured parameters, in pattern order.
  pub fn param_names(&self) -> impl Iterator<Item = &str> {
    self.segments.iter().filter_map(|s| match s {
      Segment::Param(name) => Some(name.as_str()),
      Segment::Static(_) => None,
    })
  }

  /// Segment-wise comparison against an already split path.
  fn match_segments(&self, path: &[&str]) -> Option<Params> {
    if path.len() < self.segments.len() || (self.exact && path.len() != self.segments.len()) {
      return None;
    }
    let mut params = Params::new();
    for (segment, actual) in self.segments.iter().zip(path) {
      match segment {
        Segment::Static(expected) if expected.as_str() == *actual => {}
        Segment::Static(_) => return None,
        Segment::Param(name) => {
          params.insert(name.clone(), (*actual).to_string());
        }
      }
    }
    Some(params)
  }

  pub fn match_path(&self, path: &str) -> Option<Params> {
    self.match_segments(&split_path(path))
  }
}

fn compile(pattern: &str) -> Result<Vec<Segment>> {
  if !pattern.starts_with('/') {
    return Err(TandemError::invalid_pattern(pattern, "must start with '/'"));
  }
  let mut segments = Vec::new();
  for raw in pattern.split('/').filter(|s| !s.is_empty()) {
    let segment = match raw.strip_prefix(':') {
      Some("") => return Err(TandemError::invalid_pattern(pattern, "empty parameter name")),
      Some(name) => {
        if segments.contains(&Segment::Param(name.to_string())) {
          return Err(TandemError::invalid_pattern(
            pattern,
            format!("duplicate parameter :{name}"),
          ));
        }
        Segment::Param(name.to_string())
      }
      None => Segment::Static(raw.to_string()),
    };
    segments.push(segment);
  }
  Ok(segments)
}

/// Split a request path into segments, ignoring query, fragment and empty
/// segments (`/a//b/` is `["a", "b"]`).
pub fn split_path(path: &str) -> Vec<&str> {
  let end = path.find(['?', '#']).unwrap_or(path.len());
  path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// A route resolved for one request or navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
  pub route: &'a Route,
  /// Position of the route in its table.
  pub index: usize,
  pub params: Params,
}

/// Ordered, read-only route declarations shared by server and client.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
  routes: Vec<Route>,
}

impl RouteTable {
  pub fn new(routes: Vec<Route>) -> Self {
    Self { routes }
  }

  pub fn routes(&self) -> &[Route] {
    &self.routes
  }

  pub fn match_path(&self, path: &str) -> Result<MatchResult<'_>> {
    let segments = split_path(path);
    for (index, route) in self.routes.iter().enumerate() {
      if let Some(params) = route.match_segments(&segments) {
        tracing::debug!(path, route = route.pattern(), ?params, "route matched");
        return Ok(MatchResult { route, index, params });
      }
    }
    tracing::debug!(path, "no route matched");
    Err(TandemError::RouteNotFound { path: path.to_string() })
  }
}
