/* src/server/adapter/axum/src/lib.rs */

mod error;
mod page;

use std::sync::Arc;
use std::time::Duration;

use tandem_server::RenderPipeline;
use tower_http::trace::TraceLayer;

pub use error::AxumError;
pub use page::NotFoundFn;
/// Re-export the server core for convenience
pub use tandem_server;

/// HTTP front for a [`RenderPipeline`]: answers every GET with a rendered
/// document, a not-found page, or a JSON error envelope.
pub struct PageServer {
  pipeline: RenderPipeline,
  request_timeout: Option<Duration>,
  not_found: NotFoundFn,
}

impl PageServer {
  pub fn new(pipeline: RenderPipeline) -> Self {
    Self { pipeline, request_timeout: None, not_found: Arc::new(page::default_not_found) }
  }

  /// Bound each render. Expiry is reported as a fetch failure.
  #[must_use]
  pub fn request_timeout(mut self, limit: Duration) -> Self {
    self.request_timeout = Some(limit);
    self
  }

  /// Body of the 404 page for paths no route matches.
  #[must_use]
  pub fn not_found(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
    self.not_found = Arc::new(f);
    self
  }
}

/// Extension trait that converts a `PageServer` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> axum::Router;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for PageServer {
  fn into_axum_router(self) -> axum::Router {
    page::build_router(page::PageState {
      pipeline: self.pipeline,
      request_timeout: self.request_timeout,
      not_found: self.not_found,
    })
    .layer(TraceLayer::new_for_http())
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "tandem server listening");
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
  }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %err, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown signal received");
}
