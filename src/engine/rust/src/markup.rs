/* src/engine/rust/src/markup.rs */

// Minimal markup tree: the single rendering capability shared by the server
// pipeline and the client bootstrap. Both sides build the same Node values
// and serialize them through the same writer, so identical input always
// produces byte-identical markup.

use crate::escape::escape_html;

pub(crate) const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  Text(String),
  Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  pub tag: String,
  /// Attributes in declaration order. Names are unique.
  pub attrs: Vec<(String, String)>,
  pub children: Vec<Node>,
}

/// Start building an element.
pub fn el(tag: impl Into<String>) -> Element {
  Element { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
}

pub fn text(content: impl Into<String>) -> Node {
  Node::Text(content.into())
}

pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Node {
  Node::Fragment(nodes.into_iter().collect())
}

impl Element {
  /// Set an attribute, replacing any earlier value under the same name.
  #[must_use]
  pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.set_attr(name, value);
    self
  }

  #[must_use]
  pub fn class(self, value: impl Into<String>) -> Self {
    self.attr("class", value)
  }

  #[must_use]
  pub fn child(mut self, node: impl Into<Node>) -> Self {
    self.children.push(node.into());
    self
  }

  #[must_use]
  pub fn children<N: Into<Node>>(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
    self.children.extend(nodes.into_iter().map(Into::into));
    self
  }

  pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    match self.attrs.iter_mut().find(|(k, _)| *k == name) {
      Some(slot) => slot.1 = value,
      None => self.attrs.push((name, value)),
    }
  }

  pub fn get_attr(&self, name: &str) -> Option<&str> {
    self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
  }

  pub fn is_void(&self) -> bool {
    VOID_ELEMENTS.contains(&self.tag.as_str())
  }

  pub fn to_html(&self) -> String {
    let mut out = String::new();
    write_element(self, &mut out);
    out
  }
}

impl Node {
  pub fn to_html(&self) -> String {
    let mut out = String::new();
    self.write_html(&mut out);
    out
  }

  pub fn write_html(&self, out: &mut String) {
    match self {
      Node::Element(el) => write_element(el, out),
      Node::Text(t) => out.push_str(&escape_html(t)),
      Node::Fragment(nodes) => {
        for node in nodes {
          node.write_html(out);
        }
      }
    }
  }

  /// Concatenated text of this node and all descendants.
  pub fn text_content(&self) -> String {
    let mut out = String::new();
    collect_text(self, &mut out);
    out
  }
}

fn collect_text(node: &Node, out: &mut String) {
  match node {
    Node::Text(t) => out.push_str(t),
    Node::Element(el) => el.children.iter().for_each(|c| collect_text(c, out)),
    Node::Fragment(nodes) => nodes.iter().for_each(|c| collect_text(c, out)),
  }
}

fn write_element(el: &Element, out: &mut String) {
  out.push('<');
  out.push_str(&el.tag);
  for (name, value) in &el.attrs {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
  }
  out.push('>');
  if el.is_void() {
    return;
  }
  for child in &el.children {
    child.write_html(out);
  }
  out.push_str("</");
  out.push_str(&el.tag);
  out.push('>');
}

impl From<Element> for Node {
  fn from(el: Element) -> Self {
    Node::Element(el)
  }
}

impl From<&str> for Node {
  fn from(s: &str) -> Self {
    Node::Text(s.to_string())
  }
}

impl From<String> for Node {
  fn from(s: String) -> Self {
    Node::Text(s)
  }
}
