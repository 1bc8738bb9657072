/* src/engine/rust/src/head.rs */

// Metadata Collector. Views push head contributions while they render;
// the collector is consumed once at the end of the pass.
//
// Singleton fields (title, each root attribute) keep the contribution made
// at the greatest depth; on equal depth the later contribution wins.
// List fields (meta, link) accumulate in emission order.

use crate::markup::{Element, el};

#[derive(Debug, Default)]
pub struct HeadCollector {
  title: Option<(usize, String)>,
  html_attrs: Vec<(String, usize, String)>,
  meta: Vec<Element>,
  links: Vec<Element>,
}

/// Collected head output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadTags {
  pub title: Option<String>,
  pub meta: Vec<Element>,
  pub links: Vec<Element>,
  pub html_attrs: Vec<(String, String)>,
}

impl HeadCollector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn title(&mut self, depth: usize, value: impl Into<String>) {
    let replace = self.title.as_ref().is_none_or(|(held, _)| depth >= *held);
    if replace {
      self.title = Some((depth, value.into()));
    }
  }

  pub fn html_attr(&mut self, depth: usize, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    match self.html_attrs.iter_mut().find(|(n, _, _)| *n == name) {
      Some(slot) if depth >= slot.1 => {
        slot.1 = depth;
        slot.2 = value.into();
      }
      Some(_) => {}
      None => self.html_attrs.push((name, depth, value.into())),
    }
  }

  /// `<meta name=".." content="..">`
  pub fn meta_named(&mut self, name: impl Into<String>, content: impl Into<String>) {
    self.meta.push(el("meta").attr("name", name).attr("content", content));
  }

  /// A meta tag with arbitrary attributes (`property`, `http-equiv`, ...).
  pub fn meta<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
  where
    K: Into<String>,
    V: Into<String>,
  {
    let tag = attrs.into_iter().fold(el("meta"), |tag, (k, v)| tag.attr(k, v));
    self.meta.push(tag);
  }

  pub fn link(&mut self, rel: impl Into<String>, href: impl Into<String>) {
    self.links.push(el("link").attr("rel", rel).attr("href", href));
  }

  pub fn finish(self) -> HeadTags {
    HeadTags {
      title: self.title.map(|(_, t)| t),
      meta: self.meta,
      links: self.links,
      html_attrs: self.html_attrs.into_iter().map(|(n, _, v)| (n, v)).collect(),
    }
  }
}

impl HeadTags {
  /// Title first, then meta tags, then links.
  pub fn to_html(&self) -> String {
    let mut out = String::new();
    if let Some(title) = &self.title {
      let tag = el("title").child(title.as_str());
      out.push_str(&tag.to_html());
    }
    for tag in self.meta.iter().chain(&self.links) {
      out.push_str(&tag.to_html());
    }
    out
  }
}
