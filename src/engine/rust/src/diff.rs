/* src/engine/rust/src/diff.rs */

// Positional tree diff used to detect hydration mismatches.
// Server and client render the same tree when the contract holds, so child
// lists are walked by index rather than aligned. Attribute order is ignored.

use std::collections::BTreeMap;
use std::fmt;

use crate::markup::{Element, Node};

const MAX_DIFFS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupDiff {
  TagMismatch { path: String, expected: String, actual: String },
  AttrMissing { path: String, attr: String, expected_value: String },
  AttrExtra { path: String, attr: String, actual_value: String },
  AttrValueMismatch { path: String, attr: String, expected: String, actual: String },
  TextMismatch { path: String, expected: String, actual: String },
  TypeMismatch { path: String, expected_kind: &'static str, actual_kind: &'static str },
  NodeMissing { path: String, expected_tag: String },
  NodeExtra { path: String, actual_tag: String },
}

impl fmt::Display for MarkupDiff {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::TagMismatch { path, expected, actual } => {
        write!(f, "{path}: expected <{expected}>, found <{actual}>")
      }
      Self::AttrMissing { path, attr, expected_value } => {
        write!(f, "{path}: missing attribute {attr}=\"{expected_value}\"")
      }
      Self::AttrExtra { path, attr, actual_value } => {
        write!(f, "{path}: unexpected attribute {attr}=\"{actual_value}\"")
      }
      Self::AttrValueMismatch { path, attr, expected, actual } => {
        write!(f, "{path}: attribute {attr} expected \"{expected}\", found \"{actual}\"")
      }
      Self::TextMismatch { path, expected, actual } => {
        write!(f, "{path}: text expected \"{expected}\", found \"{actual}\"")
      }
      Self::TypeMismatch { path, expected_kind, actual_kind } => {
        write!(f, "{path}: expected {expected_kind}, found {actual_kind}")
      }
      Self::NodeMissing { path, expected_tag } => write!(f, "{path}: missing {expected_tag}"),
      Self::NodeExtra { path, actual_tag } => write!(f, "{path}: unexpected {actual_tag}"),
    }
  }
}

/// At most five detailed diffs plus the total number found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
  pub diffs: Vec<MarkupDiff>,
  pub total_count: usize,
}

impl DiffReport {
  pub fn is_empty(&self) -> bool {
    self.total_count == 0
  }

  fn record(&mut self, diff: impl FnOnce() -> MarkupDiff) {
    self.total_count += 1;
    if self.diffs.len() < MAX_DIFFS {
      self.diffs.push(diff());
    }
  }
}

/// Compare two markup forests. Fragments are flattened and adjacent text
/// merged first, so a built tree compares equal to its parsed markup.
pub fn diff_markup(expected: &[Node], actual: &[Node]) -> DiffReport {
  let mut report = DiffReport::default();
  diff_children(&normalize(expected), &normalize(actual), "", &mut report);
  report
}

/// Flatten fragments, merge adjacent text, drop empty text.
fn normalize(nodes: &[Node]) -> Vec<Node> {
  let mut out = Vec::new();
  flatten_into(nodes, &mut out);
  out
}

fn flatten_into(nodes: &[Node], out: &mut Vec<Node>) {
  for node in nodes {
    match node {
      Node::Fragment(inner) => flatten_into(inner, out),
      Node::Text(t) if t.is_empty() => {}
      Node::Text(t) => match out.last_mut() {
        Some(Node::Text(prev)) => prev.push_str(t),
        _ => out.push(Node::Text(t.clone())),
      },
      Node::Element(el) => out.push(Node::Element(Element {
        tag: el.tag.clone(),
        attrs: el.attrs.clone(),
        children: normalize(&el.children),
      })),
    }
  }
}

fn diff_children(expected: &[Node], actual: &[Node], parent_path: &str, report: &mut DiffReport) {
  let min_len = expected.len().min(actual.len());
  let expected_tags = tag_counts(expected);

  for i in 0..min_len {
    match (&expected[i], &actual[i]) {
      (Node::Element(e), Node::Element(a)) => {
        let path = build_element_path(parent_path, e, i, &expected_tags);
        if e.tag != a.tag {
          report.record(|| MarkupDiff::TagMismatch {
            path,
            expected: e.tag.clone(),
            actual: a.tag.clone(),
          });
          continue;
        }
        diff_attrs(e, a, &path, report);
        diff_children(&e.children, &a.children, &path, report);
      }
      (Node::Text(e), Node::Text(a)) => {
        if e != a {
          report.record(|| MarkupDiff::TextMismatch {
            path: format_text_path(parent_path),
            expected: e.clone(),
            actual: a.clone(),
          });
        }
      }
      (e, a) => report.record(|| MarkupDiff::TypeMismatch {
        path: format!("{parent_path} > [child {i}]"),
        expected_kind: kind(e),
        actual_kind: kind(a),
      }),
    }
  }

  for node in expected.iter().skip(min_len) {
    report.record(|| MarkupDiff::NodeMissing {
      path: parent_path.to_string(),
      expected_tag: describe(node),
    });
  }
  for node in actual.iter().skip(min_len) {
    report.record(|| MarkupDiff::NodeExtra {
      path: parent_path.to_string(),
      actual_tag: describe(node),
    });
  }
}

fn diff_attrs(expected: &Element, actual: &Element, path: &str, report: &mut DiffReport) {
  let expected: BTreeMap<&str, &str> =
    expected.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
  let actual: BTreeMap<&str, &str> =
    actual.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

  for (key, eval) in &expected {
    match actual.get(key) {
      None => report.record(|| MarkupDiff::AttrMissing {
        path: path.to_string(),
        attr: (*key).to_string(),
        expected_value: (*eval).to_string(),
      }),
      Some(aval) if aval != eval => report.record(|| MarkupDiff::AttrValueMismatch {
        path: path.to_string(),
        attr: (*key).to_string(),
        expected: (*eval).to_string(),
        actual: (*aval).to_string(),
      }),
      Some(_) => {}
    }
  }
  for (key, aval) in &actual {
    if !expected.contains_key(key) {
      report.record(|| MarkupDiff::AttrExtra {
        path: path.to_string(),
        attr: (*key).to_string(),
        actual_value: (*aval).to_string(),
      });
    }
  }
}

fn kind(node: &Node) -> &'static str {
  match node {
    Node::Element(_) => "Element",
    Node::Text(_) => "Text",
    Node::Fragment(_) => "Fragment",
  }
}

fn describe(node: &Node) -> String {
  match node {
    Node::Element(el) => el.tag.clone(),
    Node::Text(t) => format!("text(\"{}\")", truncate(t, 20)),
    Node::Fragment(_) => "fragment".to_string(),
  }
}

fn tag_counts(nodes: &[Node]) -> BTreeMap<&str, usize> {
  let mut counts = BTreeMap::new();
  for node in nodes {
    if let Node::Element(el) = node {
      *counts.entry(el.tag.as_str()).or_insert(0) += 1;
    }
  }
  counts
}

/// CSS-selector-style path: tag, first class, `:nth-child` among same-tag siblings.
fn build_element_path(
  parent_path: &str,
  el: &Element,
  index: usize,
  tag_counts: &BTreeMap<&str, usize>,
) -> String {
  let mut selector = el.tag.clone();
  if let Some(first_class) = el.get_attr("class").and_then(|c| c.split_whitespace().next()) {
    selector.push('.');
    selector.push_str(first_class);
  }
  if tag_counts.get(el.tag.as_str()).copied().unwrap_or(0) > 1 {
    selector.push_str(&format!(":nth-child({})", index + 1));
  }
  if parent_path.is_empty() { selector } else { format!("{parent_path} > {selector}") }
}

fn format_text_path(parent_path: &str) -> String {
  if parent_path.is_empty() { "[text]".to_string() } else { format!("{parent_path} > [text]") }
}

fn truncate(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::markup::{el, fragment, text};
  use crate::parse::parse_markup;

  fn one(node: impl Into<Node>) -> Vec<Node> {
    vec![node.into()]
  }

  #[test]
  fn identical_trees_no_diffs() {
    let a = one(el("div").class("red").child("hello"));
    let report = diff_markup(&a, &a.clone());
    assert!(report.is_empty());
    assert!(report.diffs.is_empty());
  }

  #[test]
  fn attr_order_ignored() {
    let a = one(el("img").attr("alt", "x").attr("src", "y"));
    let b = one(el("img").attr("src", "y").attr("alt", "x"));
    assert!(diff_markup(&a, &b).is_empty());
  }

  #[test]
  fn fragments_and_split_text_normalized() {
    let built = one(el("p").child(fragment([text("by "), text("Alice")])));
    let parsed = parse_markup("<p>by Alice</p>");
    assert!(diff_markup(&built, &parsed).is_empty());
  }

  #[test]
  fn text_mismatch_detected() {
    let report = diff_markup(&one(el("p").child("hello")), &one(el("p").child("world")));
    assert_eq!(report.total_count, 1);
    assert!(matches!(&report.diffs[0], MarkupDiff::TextMismatch { expected, actual, path }
      if expected == "hello" && actual == "world" && path == "p > [text]"));
  }

  #[test]
  fn attr_differences_detected() {
    let a = one(el("img").attr("alt", "photo").attr("src", "x").attr("class", "a"));
    let b = one(el("img").attr("src", "x").attr("class", "b").attr("title", "t"));
    let report = diff_markup(&a, &b);
    assert_eq!(report.total_count, 3);
    assert!(report.diffs.iter().any(|d| matches!(d, MarkupDiff::AttrMissing { attr, .. } if attr == "alt")));
    assert!(report.diffs.iter().any(|d| matches!(d, MarkupDiff::AttrValueMismatch { attr, .. } if attr == "class")));
    assert!(report.diffs.iter().any(|d| matches!(d, MarkupDiff::AttrExtra { attr, .. } if attr == "title")));
  }

  #[test]
  fn tag_and_type_mismatch_detected() {
    let a: Vec<Node> = vec![el("div").into(), el("span").into()];
    let b: Vec<Node> = vec![el("section").into(), text("x")];
    let report = diff_markup(&a, &b);
    assert_eq!(report.total_count, 2);
    assert!(matches!(&report.diffs[0], MarkupDiff::TagMismatch { expected, actual, .. }
      if expected == "div" && actual == "section"));
    assert!(matches!(&report.diffs[1], MarkupDiff::TypeMismatch { expected_kind: "Element", actual_kind: "Text", .. }));
  }

  #[test]
  fn missing_and_extra_nodes() {
    let a: Vec<Node> = vec![el("div").into(), el("span").into()];
    let b: Vec<Node> = vec![el("div").into()];
    let report = diff_markup(&a, &b);
    assert!(matches!(&report.diffs[0], MarkupDiff::NodeMissing { expected_tag, .. } if expected_tag == "span"));
    let report = diff_markup(&b, &a);
    assert!(matches!(&report.diffs[0], MarkupDiff::NodeExtra { actual_tag, .. } if actual_tag == "span"));
  }

  #[test]
  fn nested_path_uses_class_and_nth_child() {
    let a = one(el("ul").class("items list").children([
      el("li").child("a"),
      el("li").child("b"),
    ]));
    let b = one(el("ul").class("items list").children([
      el("li").child("a"),
      el("li").child("c"),
    ]));
    let report = diff_markup(&a, &b);
    assert_eq!(report.total_count, 1);
    assert_eq!(
      report.diffs[0].to_string(),
      r#"ul.items > li:nth-child(2) > [text]: text expected "b", found "c""#
    );
  }

  #[test]
  fn diff_caps_at_five() {
    let make = |prefix: &str| -> Vec<Node> {
      (0..8).map(|i| el("p").child(format!("{prefix}{i}")).into()).collect()
    };
    let report = diff_markup(&make("a"), &make("b"));
    assert_eq!(report.diffs.len(), MAX_DIFFS);
    assert_eq!(report.total_count, 8);
  }
}
