/* demo/site/src/fetchers.rs */

//! Route fetchers backed by the JSON API. The same definitions run on the
//! server during a render pass and in the client after navigation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tandem_core::{FetcherDef, Params, Record, Result, TandemError};

use crate::records::{Page, Service};

pub const FETCH_HOMEPAGE: &str = "fetchHomepage";
pub const FETCH_SERVICE: &str = "fetchService";

#[derive(Debug, Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Arc<str>,
}

impl ApiClient {
  pub fn new(base: impl AsRef<str>) -> Self {
    Self { http: reqwest::Client::new(), base: base.as_ref().trim_end_matches('/').into() }
  }

  async fn get_json<T: DeserializeOwned>(&self, fetcher: &str, path: &str) -> Result<T> {
    let url = format!("{}{path}", self.base);
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| TandemError::fetch(fetcher, format!("GET {url}: {e}")))?;
    response
      .json()
      .await
      .map_err(|e| TandemError::fetch(fetcher, format!("GET {url}: invalid body: {e}")))
  }
}

pub fn fetch_homepage(api: ApiClient) -> FetcherDef {
  FetcherDef::record::<Page, _, _>(FETCH_HOMEPAGE, move |_: Params| {
    let api = api.clone();
    async move { api.get_json::<Page>(FETCH_HOMEPAGE, "/api/homepage").await }
  })
}

/// The services endpoint answers with an array filtered by id; the first
/// element is the record. An empty array means the service does not exist.
pub fn fetch_service(api: ApiClient) -> FetcherDef {
  FetcherDef::record::<Service, _, _>(FETCH_SERVICE, move |params: Params| {
    let api = api.clone();
    async move {
      let id = params.get("id").map(String::as_str).unwrap_or_default();
      let path = format!("/api/services/{id}");
      let services: Vec<Service> = api.get_json(FETCH_SERVICE, &path).await?;
      services
        .into_iter()
        .next()
        .ok_or_else(|| TandemError::RecordMissing { key: Service::KEY.to_string() })
    }
  })
  .identified_by("id", "id")
}
