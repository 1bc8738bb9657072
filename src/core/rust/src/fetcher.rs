/* src/core/rust/src/fetcher.rs */

//! Data Fetcher Registry.
//!
//! A fetcher turns matched route parameters into the route's contribution
//! to the PageData bag. It is called at most once per render pass, must be
//! safe to invoke concurrently, and is never retried here.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::{PageData, Record, identity_string};
use crate::errors::{Result, TandemError};
use crate::route::Params;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type FetchFn = Arc<dyn Fn(Params) -> BoxFuture<Result<PageData>> + Send + Sync>;

/// Links a route parameter to the field of the fetched record that
/// identifies it (`/services/:id` and `service.id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub param: String,
  pub field: String,
}

#[derive(Clone)]
pub struct FetcherDef {
  pub name: String,
  /// Key of the record this fetcher contributes.
  pub data_key: String,
  pub identity: Option<Identity>,
  pub handler: FetchFn,
}

impl std::fmt::Debug for FetcherDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FetcherDef")
      .field("name", &self.name)
      .field("data_key", &self.data_key)
      .field("identity", &self.identity)
      .finish_non_exhaustive()
  }
}

impl FetcherDef {
  pub fn new<F, Fut>(name: impl Into<String>, data_key: impl Into<String>, handler: F) -> Self
  where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageData>> + Send + 'static,
  {
    Self {
      name: name.into(),
      data_key: data_key.into(),
      identity: None,
      handler: Arc::new(move |params| Box::pin(handler(params))),
    }
  }

  /// Fetcher producing a single typed record, stored under `R::KEY`.
  pub fn record<R, F, Fut>(name: impl Into<String>, handler: F) -> Self
  where
    R: Record + Send + 'static,
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
  {
    let handler = Arc::new(handler);
    Self::new(name, R::KEY, move |params| {
      let handler = Arc::clone(&handler);
      async move {
        let record = handler(params).await?;
        PageData::new().with_record(&record)
      }
    })
  }

  #[must_use]
  pub fn identified_by(mut self, param: impl Into<String>, field: impl Into<String>) -> Self {
    self.identity = Some(Identity { param: param.into(), field: field.into() });
    self
  }

  /// Whether `data` already holds this fetcher's record for `params`.
  ///
  /// The record must be present and non-null. With an identity, its
  /// identifying field must equal the matched parameter as a string.
  pub fn is_satisfied_by(&self, data: &PageData, params: &Params) -> bool {
    let Some(record) = data.get(&self.data_key).filter(|v| !v.is_null()) else {
      return false;
    };
    let Some(identity) = &self.identity else {
      return true;
    };
    let held = record.get(&identity.field).and_then(identity_string);
    match (held, params.get(&identity.param)) {
      (Some(held), Some(wanted)) => held == *wanted,
      _ => false,
    }
  }

  /// Invoke the fetcher once, optionally bounded by `timeout`.
  ///
  /// Handler errors are reported as `FetchFailure` for this fetcher, except
  /// `RecordMissing`, which passes through. A result without `data_key` is
  /// `RecordMissing`.
  pub async fn fetch(&self, params: Params, timeout: Option<Duration>) -> Result<PageData> {
    let started = Instant::now();
    let call = (self.handler)(params);
    let outcome = match timeout {
      Some(limit) => match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => {
          let timeout_ms = limit.as_millis() as u64;
          tracing::warn!(fetcher = %self.name, timeout_ms, "fetch timed out");
          return Err(TandemError::fetch_timeout(&self.name, limit));
        }
      },
      None => call.await,
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let data = match outcome {
      Ok(data) => data,
      Err(err) => {
        tracing::warn!(fetcher = %self.name, elapsed_ms, error = %err, "fetch failed");
        return Err(match err {
          TandemError::RecordMissing { .. } | TandemError::FetchFailure { .. } => err,
          other => TandemError::fetch(&self.name, other.to_string()),
        });
      }
    };
    if !data.get(&self.data_key).is_some_and(|v| !v.is_null()) {
      tracing::warn!(fetcher = %self.name, key = %self.data_key, "fetch returned no record");
      return Err(TandemError::RecordMissing { key: self.data_key.clone() });
    }
    tracing::debug!(fetcher = %self.name, elapsed_ms, "fetch complete");
    Ok(data)
  }
}

/// Fetchers by name. Read-only once the site is built.
#[derive(Debug, Clone, Default)]
pub struct FetcherRegistry {
  fetchers: HashMap<String, Arc<FetcherDef>>,
}

impl FetcherRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, def: FetcherDef) {
    self.fetchers.insert(def.name.clone(), Arc::new(def));
  }

  pub fn get(&self, name: &str) -> Option<&Arc<FetcherDef>> {
    self.fetchers.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fetchers.contains_key(name)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde::{Deserialize, Serialize};
  use serde_json::json;

  use super::*;

  #[derive(Debug, Serialize, Deserialize)]
  struct Item {
    id: u32,
    name: String,
  }

  impl Record for Item {
    const KEY: &'static str = "item";
  }

  fn params(id: &str) -> Params {
    Params::from([("id".to_string(), id.to_string())])
  }

  fn item_fetcher(calls: Arc<AtomicUsize>) -> FetcherDef {
    FetcherDef::record::<Item, _, _>("fetchItem", move |p: Params| {
      calls.fetch_add(1, Ordering::SeqCst);
      async move {
        let id: u32 = p["id"].parse().map_err(|_| TandemError::fetch("fetchItem", "bad id"))?;
        Ok(Item { id, name: format!("Item {id}") })
      }
    })
    .identified_by("id", "id")
  }

  #[tokio::test]
  async fn record_fetcher_stores_under_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = item_fetcher(Arc::clone(&calls));
    let data = fetcher.fetch(params("7"), None).await.unwrap();
    assert_eq!(data.get("item"), Some(&json!({"id": 7, "name": "Item 7"})));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn satisfied_only_for_matching_identity() {
    let fetcher = item_fetcher(Arc::new(AtomicUsize::new(0)));
    let mut data = PageData::new();
    assert!(!fetcher.is_satisfied_by(&data, &params("7")));
    data.insert("item", json!({"id": 7, "name": "Widget"}));
    assert!(fetcher.is_satisfied_by(&data, &params("7")));
    assert!(!fetcher.is_satisfied_by(&data, &params("8")));
    data.insert("item", json!(null));
    assert!(!fetcher.is_satisfied_by(&data, &params("7")));
  }

  #[test]
  fn satisfied_without_identity_when_present() {
    let fetcher = FetcherDef::new("fetchHome", "page", |_| async { Ok(PageData::new()) });
    let mut data = PageData::new();
    assert!(!fetcher.is_satisfied_by(&data, &Params::new()));
    data.insert("page", json!({"title": "Home"}));
    assert!(fetcher.is_satisfied_by(&data, &Params::new()));
  }

  #[tokio::test]
  async fn handler_error_becomes_fetch_failure() {
    let fetcher = FetcherDef::new("fetchHome", "page", |_| async {
      Err(TandemError::SerializationFailure("upstream sent garbage".into()))
    });
    let err = fetcher.fetch(Params::new(), None).await.unwrap_err();
    assert!(matches!(err, TandemError::FetchFailure { ref fetcher, .. } if fetcher == "fetchHome"));
  }

  #[tokio::test]
  async fn missing_key_is_record_missing() {
    let fetcher = FetcherDef::new("fetchHome", "page", |_| async { Ok(PageData::new()) });
    let err = fetcher.fetch(Params::new(), None).await.unwrap_err();
    assert_eq!(err, TandemError::RecordMissing { key: "page".into() });
  }

  #[tokio::test]
  async fn timeout_is_fetch_failure() {
    let fetcher = FetcherDef::new("slow", "page", |_| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok(PageData::new())
    });
    let err = fetcher.fetch(Params::new(), Some(Duration::from_millis(20))).await.unwrap_err();
    assert!(err.is_fetch_failure());
    assert!(err.to_string().contains("timed out"));
  }

  #[test]
  fn registry_lookup() {
    let mut registry = FetcherRegistry::new();
    registry.register(item_fetcher(Arc::new(AtomicUsize::new(0))));
    assert!(registry.contains("fetchItem"));
    assert_eq!(registry.get("fetchItem").map(|f| f.data_key.as_str()), Some("item"));
    assert!(registry.get("fetchHome").is_none());
  }
}
