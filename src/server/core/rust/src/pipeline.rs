/* src/server/core/rust/src/pipeline.rs */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tandem_core::{EncodeOptions, MatchResult, PageData, Result, Site, encode_page_data};
use tandem_engine::{AssetRef, SerializedPayload, merge_html_attrs};

/// Route-independent data merged into every bag after the route fetcher.
pub type Contribution = Arc<dyn Fn(&MatchResult<'_>) -> Result<PageData> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
  /// Upper bound for the route fetcher. Expiry is a fetch failure.
  pub fetch_timeout: Option<Duration>,
  /// Default `lang` attribute of the document root.
  pub lang: String,
  pub ascii_payload: bool,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self { fetch_timeout: None, lang: "en".to_string(), ascii_payload: false }
  }
}

/// Server Render Pipeline. Holds only read-only state, so one instance
/// serves any number of concurrent requests; every pass allocates its own
/// bag and render context.
#[derive(Clone)]
pub struct RenderPipeline {
  site: Arc<Site>,
  assets: Vec<AssetRef>,
  contributions: Vec<Contribution>,
  options: PipelineOptions,
}

impl RenderPipeline {
  pub fn new(site: Arc<Site>) -> Self {
    Self {
      site,
      assets: Vec::new(),
      contributions: Vec::new(),
      options: PipelineOptions::default(),
    }
  }

  /// Client asset references, in document order.
  #[must_use]
  pub fn assets(mut self, assets: impl IntoIterator<Item = AssetRef>) -> Self {
    self.assets.extend(assets);
    self
  }

  #[must_use]
  pub fn contribution(
    mut self,
    f: impl Fn(&MatchResult<'_>) -> Result<PageData> + Send + Sync + 'static,
  ) -> Self {
    self.contributions.push(Arc::new(f));
    self
  }

  #[must_use]
  pub fn options(mut self, options: PipelineOptions) -> Self {
    self.options = options;
    self
  }

  pub fn site(&self) -> &Arc<Site> {
    &self.site
  }

  /// Match, fetch, merge, render, encode. Any failure aborts the pass and
  /// nothing partial is returned.
  pub async fn render(&self, path: &str) -> Result<SerializedPayload> {
    let started = Instant::now();
    match self.render_pass(path).await {
      Ok((route, payload)) => {
        tracing::info!(
          path,
          route = %route,
          elapsed_ms = started.elapsed().as_millis() as u64,
          "page rendered"
        );
        Ok(payload)
      }
      Err(err) => {
        tracing::warn!(path, code = err.code(), error = %err, "render aborted");
        Err(err)
      }
    }
  }

  pub async fn render_document(&self, path: &str) -> Result<String> {
    Ok(self.render(path).await?.to_document())
  }

  async fn render_pass(&self, path: &str) -> Result<(String, SerializedPayload)> {
    let matched = self.site.match_path(path)?;

    let mut data = PageData::new();
    if let Some(fetcher) = self.site.fetcher_for(matched.route) {
      let fetched = fetcher.fetch(matched.params.clone(), self.options.fetch_timeout).await?;
      data.merge(fetched);
    }
    for contribution in &self.contributions {
      data.merge(contribution(&matched)?);
    }

    let status = self.site.status_for(&matched, &data);
    let (node, head) = self.site.render(path, &matched, &data, &status)?;
    let data_blob =
      encode_page_data(&data, EncodeOptions { ascii_only: self.options.ascii_payload })?;

    let defaults = [("lang".to_string(), self.options.lang.clone())];
    let payload = SerializedPayload {
      markup: node.to_html(),
      metadata_tags: head.to_html(),
      html_attrs: merge_html_attrs(&defaults, &head.html_attrs),
      data_blob,
      assets: self.assets.clone(),
    };
    Ok((matched.route.pattern().to_string(), payload))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use serde::{Deserialize, Serialize};
  use serde_json::json;
  use tandem_core::{
    FetcherDef, Params, Record, RenderContext, Route, TandemError, decode_page_data,
  };
  use tandem_engine::{Node, el, extract_data_blob};

  use super::*;

  #[derive(Debug, Serialize, Deserialize)]
  struct Item {
    id: u32,
    name: String,
  }

  impl Record for Item {
    const KEY: &'static str = "item";
  }

  fn home(ctx: &mut RenderContext<'_>) -> Result<Node> {
    ctx.title("Home");
    Ok(el("h1").child("Home").into())
  }

  fn item_view(ctx: &mut RenderContext<'_>) -> Result<Node> {
    let item: Item = ctx.require()?;
    ctx.title(item.name.clone());
    ctx.meta("description", format!("Item {}", item.id));
    Ok(el("article").child(el("h1").child(item.name)).into())
  }

  fn site(calls: Arc<AtomicUsize>, fail: bool) -> Arc<Site> {
    let fetch_item = FetcherDef::record::<Item, _, _>("fetchItem", move |p: Params| {
      calls.fetch_add(1, Ordering::SeqCst);
      async move {
        if fail {
          return Err(TandemError::fetch("fetchItem", "upstream unavailable"));
        }
        let id = p["id"].parse().unwrap_or_default();
        Ok(Item { id, name: "Widget".into() })
      }
    })
    .identified_by("id", "id");
    let site = Site::builder()
      .route(Route::new("/", "Home").unwrap().exact(true))
      .route(Route::new("/items/:id", "Item").unwrap().fetcher("fetchItem"))
      .view("Home", home)
      .view("Item", item_view)
      .fetcher(fetch_item)
      .build()
      .unwrap();
    Arc::new(site)
  }

  #[tokio::test]
  async fn renders_item_with_embedded_bag() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = RenderPipeline::new(site(Arc::clone(&calls), false))
      .assets([AssetRef::style("/css/index.css", true), AssetRef::script("/js/client.js")]);
    let payload = pipeline.render("/items/7").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(payload.markup.contains("Widget"));
    assert_eq!(
      payload.metadata_tags,
      r#"<title>Widget</title><meta name="description" content="Item 7">"#
    );
    let bag = decode_page_data(&payload.data_blob).unwrap();
    assert_eq!(bag.into_value(), json!({"item": {"id": 7, "name": "Widget"}}));

    let doc = payload.to_document();
    assert!(doc.starts_with(r#"<!DOCTYPE html><html lang="en">"#));
    assert_eq!(extract_data_blob(&doc), Some(payload.data_blob.as_str()));
  }

  #[tokio::test]
  async fn static_route_skips_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let payload = RenderPipeline::new(site(Arc::clone(&calls), false)).render("/").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(payload.markup, "<h1>Home</h1>");
    assert_eq!(payload.data_blob, "{}");
  }

  #[tokio::test]
  async fn contribution_is_merged_into_bag() {
    let pipeline = RenderPipeline::new(site(Arc::new(AtomicUsize::new(0)), false)).contribution(
      |_: &MatchResult<'_>| -> Result<PageData> {
        let mut data = PageData::new();
        data.insert("notification", json!({"message": "hi", "type": "info"}));
        Ok(data)
      },
    );
    for path in ["/", "/items/3"] {
      let payload = pipeline.render(path).await.unwrap();
      let bag = decode_page_data(&payload.data_blob).unwrap();
      assert_eq!(bag.get("notification"), Some(&json!({"message": "hi", "type": "info"})));
    }
  }

  #[tokio::test]
  async fn fetch_failure_aborts_pass() {
    let pipeline = RenderPipeline::new(site(Arc::new(AtomicUsize::new(0)), true));
    let err = pipeline.render_document("/items/7").await.unwrap_err();
    assert!(err.is_fetch_failure(), "{err}");
  }

  #[tokio::test]
  async fn unknown_path_is_route_not_found() {
    let pipeline = RenderPipeline::new(site(Arc::new(AtomicUsize::new(0)), false));
    let err = pipeline.render("/nowhere").await.unwrap_err();
    assert_eq!(err, TandemError::RouteNotFound { path: "/nowhere".into() });
  }

  #[tokio::test]
  async fn slow_fetch_times_out() {
    let slow = FetcherDef::new("slow", "page", |_| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok(PageData::new())
    });
    let site = Site::builder()
      .route(Route::new("/", "Home").unwrap().fetcher("slow"))
      .view("Home", home)
      .fetcher(slow)
      .build()
      .unwrap();
    let pipeline = RenderPipeline::new(Arc::new(site)).options(PipelineOptions {
      fetch_timeout: Some(Duration::from_millis(20)),
      ..PipelineOptions::default()
    });
    let err = pipeline.render("/").await.unwrap_err();
    assert!(err.is_fetch_failure());
  }

  #[tokio::test]
  async fn view_html_attrs_override_lang() {
    let site = Site::builder()
      .route(Route::new("/", "Home").unwrap())
      .view("Home", |ctx: &mut RenderContext<'_>| -> Result<Node> {
        ctx.html_attr("lang", "fr");
        ctx.html_attr("class", "dark");
        Ok(el("main").into())
      })
      .build()
      .unwrap();
    let payload = RenderPipeline::new(Arc::new(site)).render("/").await.unwrap();
    assert_eq!(
      payload.html_attrs,
      vec![("lang".to_string(), "fr".to_string()), ("class".to_string(), "dark".to_string())]
    );
  }
}
