/* src/core/rust/src/site.rs */

//! A `Site` bundles everything server and client must agree on: the route
//! table, the views it references, the fetchers, and the application shell.
//! Both sides build it from the same declaration, so a route cannot resolve
//! differently on either side.

use std::collections::HashMap;
use std::sync::Arc;

use tandem_engine::{HeadTags, Node, el};

use crate::data::PageData;
use crate::errors::{Result, TandemError};
use crate::fetcher::{FetcherDef, FetcherRegistry};
use crate::route::{MatchResult, Route, RouteTable};
use crate::view::{RenderContext, Shell, View, ViewStatus};

pub type FailureFn = Arc<dyn Fn(&mut RenderContext<'_>, &str) -> Node + Send + Sync>;

impl<F> Shell for F
where
  F: Fn(&mut RenderContext<'_>, &dyn Fn(&mut RenderContext<'_>) -> Result<Node>) -> Result<Node>
    + Send
    + Sync,
{
  fn render(
    &self,
    ctx: &mut RenderContext<'_>,
    outlet: &dyn Fn(&mut RenderContext<'_>) -> Result<Node>,
  ) -> Result<Node> {
    self(ctx, outlet)
  }
}

pub struct Site {
  routes: RouteTable,
  views: HashMap<String, Arc<dyn View>>,
  fetchers: FetcherRegistry,
  shell: Option<Arc<dyn Shell>>,
  loading: Arc<dyn View>,
  failure: FailureFn,
}

impl std::fmt::Debug for Site {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut views: Vec<_> = self.views.keys().collect();
    views.sort();
    f.debug_struct("Site")
      .field("routes", &self.routes)
      .field("views", &views)
      .field("fetchers", &self.fetchers)
      .field("shell", &self.shell.is_some())
      .finish_non_exhaustive()
  }
}

fn default_loading(_: &mut RenderContext<'_>) -> Result<Node> {
  Ok(el("div").child("Page loading...").into())
}

fn default_failure(_: &mut RenderContext<'_>, message: &str) -> Node {
  el("div").class("error").child(message.to_string()).into()
}

impl Site {
  pub fn builder() -> SiteBuilder {
    SiteBuilder::default()
  }

  pub fn routes(&self) -> &RouteTable {
    &self.routes
  }

  pub fn match_path(&self, path: &str) -> Result<MatchResult<'_>> {
    self.routes.match_path(path)
  }

  pub fn fetcher_for(&self, route: &Route) -> Option<&Arc<FetcherDef>> {
    route.fetcher_name().and_then(|name| self.fetchers.get(name))
  }

  /// `Ready` when the route needs no fetch or `data` already satisfies it
  /// for the matched parameters, `Loading` otherwise.
  pub fn status_for(&self, matched: &MatchResult<'_>, data: &PageData) -> ViewStatus {
    match self.fetcher_for(matched.route) {
      Some(fetcher) if !fetcher.is_satisfied_by(data, &matched.params) => ViewStatus::Loading,
      _ => ViewStatus::Ready,
    }
  }

  /// One synchronous render pass: the shell at depth 0, the route content
  /// (view, loading indicator or failure fallback, per `status`) at depth 1.
  ///
  /// Errors raised by a view are reported as `Render` errors naming it.
  pub fn render(
    &self,
    path: &str,
    matched: &MatchResult<'_>,
    data: &PageData,
    status: &ViewStatus,
  ) -> Result<(Node, HeadTags)> {
    let view_id = matched.route.view_id();
    let view = self.views.get(view_id).ok_or_else(|| TandemError::UnknownView(view_id.into()))?;

    let content = |ctx: &mut RenderContext<'_>| -> Result<Node> {
      ctx.nested(|ctx| match status {
        ViewStatus::Ready => view.render(ctx).map_err(|err| match err {
          TandemError::Render { .. } => err,
          other => TandemError::render(view_id, other.to_string()),
        }),
        ViewStatus::Loading => self.loading.render(ctx),
        ViewStatus::Error(message) => Ok((self.failure)(ctx, message.as_str())),
      })
    };

    let mut ctx = RenderContext::new(path, &matched.params, data);
    let node = match &self.shell {
      Some(shell) => shell.render(&mut ctx, &content)?,
      None => content(&mut ctx)?,
    };
    Ok((node, ctx.finish()))
  }
}

#[derive(Default)]
pub struct SiteBuilder {
  routes: Vec<Route>,
  views: HashMap<String, Arc<dyn View>>,
  fetchers: FetcherRegistry,
  shell: Option<Arc<dyn Shell>>,
  loading: Option<Arc<dyn View>>,
  failure: Option<FailureFn>,
}

impl SiteBuilder {
  /// Append a route. Declaration order is match order.
  #[must_use]
  pub fn route(mut self, route: Route) -> Self {
    self.routes.push(route);
    self
  }

  #[must_use]
  pub fn view(mut self, id: impl Into<String>, view: impl View + 'static) -> Self {
    self.views.insert(id.into(), Arc::new(view));
    self
  }

  #[must_use]
  pub fn fetcher(mut self, def: FetcherDef) -> Self {
    self.fetchers.register(def);
    self
  }

  #[must_use]
  pub fn shell(mut self, shell: impl Shell + 'static) -> Self {
    self.shell = Some(Arc::new(shell));
    self
  }

  #[must_use]
  pub fn loading(mut self, view: impl View + 'static) -> Self {
    self.loading = Some(Arc::new(view));
    self
  }

  #[must_use]
  pub fn failure(
    mut self,
    f: impl Fn(&mut RenderContext<'_>, &str) -> Node + Send + Sync + 'static,
  ) -> Self {
    self.failure = Some(Arc::new(f));
    self
  }

  /// Check that every view and fetcher a route references exists.
  pub fn build(self) -> Result<Site> {
    for route in &self.routes {
      if !self.views.contains_key(route.view_id()) {
        return Err(TandemError::UnknownView(route.view_id().to_string()));
      }
      if let Some(name) = route.fetcher_name()
        && !self.fetchers.contains(name)
      {
        return Err(TandemError::UnknownFetcher(name.to_string()));
      }
    }
    Ok(Site {
      routes: RouteTable::new(self.routes),
      views: self.views,
      fetchers: self.fetchers,
      shell: self.shell,
      loading: self.loading.unwrap_or_else(|| Arc::new(default_loading) as Arc<dyn View>),
      failure: self.failure.unwrap_or_else(|| Arc::new(default_failure) as FailureFn),
    })
  }
}
