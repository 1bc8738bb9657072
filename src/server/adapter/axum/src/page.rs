/* src/server/adapter/axum/src/page.rs */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tandem_server::RenderPipeline;
use tandem_server::tandem_core::TandemError;
use tandem_server::tandem_core::tandem_engine::escape_html;

use crate::error::AxumError;

pub type NotFoundFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub(crate) struct PageState {
  pub pipeline: RenderPipeline,
  pub request_timeout: Option<Duration>,
  pub not_found: NotFoundFn,
}

pub(crate) fn default_not_found(path: &str) -> String {
  format!(
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Not found</title></head>\
     <body><h1>Not found</h1><p>No page at {}</p></body></html>",
    escape_html(path)
  )
}

/// Every GET falls through to the page handler; the route table decides.
pub(crate) fn build_router(state: PageState) -> Router {
  Router::new().fallback(get(handle_page)).with_state(Arc::new(state))
}

async fn handle_page(State(state): State<Arc<PageState>>, uri: Uri) -> Result<Response, AxumError> {
  let path = uri.path();
  let render = state.pipeline.render_document(path);
  let outcome = match state.request_timeout {
    Some(limit) => tokio::time::timeout(limit, render)
      .await
      .unwrap_or_else(|_| Err(request_timeout(&state.pipeline, path, limit))),
    None => render.await,
  };

  match outcome {
    Ok(document) => Ok(Html(document).into_response()),
    Err(TandemError::RouteNotFound { .. }) => {
      Ok((StatusCode::NOT_FOUND, Html((state.not_found)(path))).into_response())
    }
    Err(err) => Err(err.into()),
  }
}

/// A render cut short by the request deadline is a failure of the route's
/// fetcher, the only suspension point of a pass.
fn request_timeout(pipeline: &RenderPipeline, path: &str, limit: Duration) -> TandemError {
  let fetcher = pipeline
    .site()
    .match_path(path)
    .ok()
    .and_then(|m| m.route.fetcher_name().map(str::to_string))
    .unwrap_or_else(|| "request".to_string());
  let timeout_ms = limit.as_millis() as u64;
  tracing::warn!(path, fetcher = %fetcher, timeout_ms, "request timed out");
  TandemError::fetch_timeout(fetcher, limit)
}
