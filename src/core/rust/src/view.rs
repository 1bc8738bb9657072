/* src/core/rust/src/view.rs */

//! View contract and the per-pass RenderContext.

use tandem_engine::{HeadCollector, HeadTags, Node};

use crate::data::{PageData, Record};
use crate::errors::Result;
use crate::route::Params;

/// State of one render pass, passed explicitly down the view tree.
///
/// Created for a single pass and consumed by [`RenderContext::finish`],
/// which is the only way to read the collected head metadata.
pub struct RenderContext<'a> {
  pub path: &'a str,
  pub params: &'a Params,
  pub data: &'a PageData,
  head: HeadCollector,
  depth: usize,
}

impl<'a> RenderContext<'a> {
  pub fn new(path: &'a str, params: &'a Params, data: &'a PageData) -> Self {
    Self { path, params, data, head: HeadCollector::new(), depth: 0 }
  }

  /// Nesting level of the view currently rendering. The shell is 0.
  pub fn depth(&self) -> usize {
    self.depth
  }

  pub fn title(&mut self, value: impl Into<String>) {
    self.head.title(self.depth, value);
  }

  pub fn meta(&mut self, name: impl Into<String>, content: impl Into<String>) {
    self.head.meta_named(name, content);
  }

  pub fn meta_attrs<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
  where
    K: Into<String>,
    V: Into<String>,
  {
    self.head.meta(attrs);
  }

  pub fn link(&mut self, rel: impl Into<String>, href: impl Into<String>) {
    self.head.link(rel, href);
  }

  pub fn html_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.head.html_attr(self.depth, name, value);
  }

  /// Run `f` one level deeper in the view tree.
  pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
    self.depth += 1;
    let out = f(self);
    self.depth -= 1;
    out
  }

  pub fn record<R: Record>(&self) -> Result<Option<R>> {
    self.data.record()
  }

  pub fn require<R: Record>(&self) -> Result<R> {
    self.data.require()
  }

  pub fn param(&self, name: &str) -> Option<&str> {
    self.params.get(name).map(String::as_str)
  }

  pub fn finish(self) -> HeadTags {
    self.head.finish()
  }
}

/// A view: the current context in, a markup tree out.
///
/// Implemented for every matching closure or fn, so plain functions can be
/// registered directly.
pub trait View: Send + Sync {
  fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Node>;
}

impl<F> View for F
where
  F: Fn(&mut RenderContext<'_>) -> Result<Node> + Send + Sync,
{
  fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Node> {
    self(ctx)
  }
}

/// Application frame rendered around every route view. `outlet` renders
/// the matched route's content one level deeper.
pub trait Shell: Send + Sync {
  fn render(
    &self,
    ctx: &mut RenderContext<'_>,
    outlet: &dyn Fn(&mut RenderContext<'_>) -> Result<Node>,
  ) -> Result<Node>;
}

/// Per-view state on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
  Loading,
  Ready,
  Error(String),
}

impl ViewStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, Self::Loading)
  }
}

#[cfg(test)]
mod tests {
  use tandem_engine::el;

  use super::*;

  fn page(ctx: &mut RenderContext<'_>) -> Result<Node> {
    ctx.title("Page");
    ctx.meta("description", "d");
    Ok(el("p").child(ctx.path.to_string()).into())
  }

  #[test]
  fn fn_items_are_views() {
    let params = Params::new();
    let data = PageData::new();
    let mut ctx = RenderContext::new("/x", &params, &data);
    let node = View::render(&page, &mut ctx).unwrap();
    assert_eq!(node.to_html(), "<p>/x</p>");
    let head = ctx.finish();
    assert_eq!(head.title.as_deref(), Some("Page"));
    assert_eq!(head.meta.len(), 1);
  }

  #[test]
  fn nested_contributions_override_by_depth() {
    let params = Params::new();
    let data = PageData::new();
    let mut ctx = RenderContext::new("/", &params, &data);
    ctx.title("Shell");
    ctx.html_attr("lang", "en");
    ctx.nested(|ctx| {
      assert_eq!(ctx.depth(), 1);
      ctx.nested(|ctx| ctx.title("Deep"));
      ctx.title("Middle");
      ctx.html_attr("lang", "fr");
    });
    assert_eq!(ctx.depth(), 0);
    ctx.title("Late shell");
    let head = ctx.finish();
    assert_eq!(head.title.as_deref(), Some("Deep"));
    assert_eq!(head.html_attrs, vec![("lang".to_string(), "fr".to_string())]);
  }

  #[test]
  fn params_reachable() {
    let params = Params::from([("id".to_string(), "3".to_string())]);
    let data = PageData::new();
    let ctx = RenderContext::new("/services/3", &params, &data);
    assert_eq!(ctx.param("id"), Some("3"));
    assert_eq!(ctx.param("slug"), None);
  }

  #[test]
  fn status_terminality() {
    assert!(!ViewStatus::Loading.is_terminal());
    assert!(ViewStatus::Ready.is_terminal());
    assert!(ViewStatus::Error("x".into()).is_terminal());
  }
}
