/* src/core/rust/src/errors.rs */

use std::time::Duration;

pub type Result<T, E = TandemError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TandemError {
  #[error("no route matches {path}")]
  RouteNotFound { path: String },

  #[error("fetcher {fetcher} failed: {message}")]
  FetchFailure { fetcher: String, message: String },

  #[error("page data has no {key} record")]
  RecordMissing { key: String },

  #[error("page data cannot be serialized: {0}")]
  SerializationFailure(String),

  #[error("invalid {key} record: {message}")]
  InvalidData { key: String, message: String },

  #[error("view {view} failed: {message}")]
  Render { view: String, message: String },

  #[error("unknown view {0}")]
  UnknownView(String),

  #[error("unknown fetcher {0}")]
  UnknownFetcher(String),

  #[error("invalid route pattern {pattern}: {reason}")]
  InvalidPattern { pattern: String, reason: String },

  #[error("malformed payload: {0}")]
  MalformedPayload(String),

  #[error("embedded payload already consumed")]
  PayloadConsumed,

  #[error("hydration mismatch at {location} ({total} differences): {first}")]
  HydrationMismatch { location: String, total: usize, first: String },
}

impl TandemError {
  pub fn fetch(fetcher: impl Into<String>, message: impl Into<String>) -> Self {
    Self::FetchFailure { fetcher: fetcher.into(), message: message.into() }
  }

  pub fn fetch_timeout(fetcher: impl Into<String>, after: Duration) -> Self {
    Self::fetch(fetcher, format!("timed out after {}ms", after.as_millis()))
  }

  pub fn render(view: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Render { view: view.into(), message: message.into() }
  }

  pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidPattern { pattern: pattern.into(), reason: reason.into() }
  }

  /// Stable machine-readable code.
  pub fn code(&self) -> &'static str {
    match self {
      Self::RouteNotFound { .. } | Self::RecordMissing { .. } => "NOT_FOUND",
      Self::FetchFailure { .. } => "FETCH_FAILED",
      Self::SerializationFailure(_) => "SERIALIZATION_ERROR",
      Self::InvalidData { .. } | Self::MalformedPayload(_) => "VALIDATION_ERROR",
      Self::Render { .. } => "RENDER_ERROR",
      Self::HydrationMismatch { .. } => "HYDRATION_MISMATCH",
      Self::UnknownView(_)
      | Self::UnknownFetcher(_)
      | Self::InvalidPattern { .. }
      | Self::PayloadConsumed => "INTERNAL_ERROR",
    }
  }

  /// HTTP status a server should answer with.
  pub fn status(&self) -> u16 {
    match self.code() {
      "NOT_FOUND" => 404,
      "FETCH_FAILED" => 502,
      _ => 500,
    }
  }

  pub fn is_fetch_failure(&self) -> bool {
    matches!(self, Self::FetchFailure { .. })
  }
}

impl From<serde_json::Error> for TandemError {
  fn from(err: serde_json::Error) -> Self {
    Self::SerializationFailure(err.to_string())
  }
}
