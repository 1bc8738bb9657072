/* demo/site/src/lib.rs */

pub mod api;
pub mod config;
pub mod fetchers;
pub mod records;
pub mod routes;
pub mod views;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tandem_core::{MatchResult, PageData};
use tandem_server::{PipelineOptions, RenderPipeline};
use tandem_server_axum::{IntoAxumRouter, PageServer, shutdown_signal};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::api::Content;
use crate::config::SiteConfig;
use crate::fetchers::ApiClient;

/// Page pipeline for `config`, with the configured notification merged
/// into every page's data.
pub fn pipeline(config: &SiteConfig) -> Result<RenderPipeline> {
  let api = ApiClient::new(config.api_base());
  let site = routes::build_site(&api, &config.app.title).context("invalid site declaration")?;
  let mut pipeline = RenderPipeline::new(Arc::new(site)).assets(config.asset_refs()).options(
    PipelineOptions {
      fetch_timeout: Some(config.fetch_timeout()),
      lang: config.app.lang.clone(),
      ascii_payload: config.server.ascii_payload,
    },
  );
  if let Some(note) = config.notification() {
    pipeline = pipeline.contribution(move |_: &MatchResult<'_>| PageData::new().with_record(&note));
  }
  Ok(pipeline)
}

/// Mock API, static files from `public_dir`, and rendered pages for
/// everything else.
pub fn app(config: &SiteConfig) -> Result<Router> {
  let content = match &config.server.content_path {
    Some(path) => Content::load(path)?,
    None => Content::default(),
  };
  let pages = PageServer::new(pipeline(config)?)
    .request_timeout(config.request_timeout())
    .into_axum_router();
  let files = ServeDir::new(&config.server.public_dir).fallback(pages);
  Ok(api::router(Arc::new(content)).fallback_service(files).layer(CompressionLayer::new()))
}

pub async fn serve(config: SiteConfig) -> Result<()> {
  let router = app(&config)?;
  let addr = config.listen_addr();
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("failed to bind {addr}"))?;
  tracing::info!(
    address = %listener.local_addr()?,
    title = %config.app.title,
    api = %config.api_base(),
    "tandem demo listening"
  );
  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")
}
