/* src/engine/rust/src/parse.rs */

// Lenient HTML fragment parser for structural comparison.
// Comments are dropped, adjacent text nodes merged, and entities decoded,
// so the result compares equal to the Node tree that produced the markup.
// Slicing is safe: every split point is an ASCII delimiter.

use crate::escape::unescape_html;
use crate::markup::{Element, Node, VOID_ELEMENTS};

pub fn parse_markup(html: &str) -> Vec<Node> {
  let mut pos = 0;
  let mut nodes = parse_nodes(html, &mut pos, None);
  merge_adjacent_text(&mut nodes);
  nodes
}

fn parse_nodes(html: &str, pos: &mut usize, parent_tag: Option<&str>) -> Vec<Node> {
  let bytes = html.as_bytes();
  let mut nodes = Vec::new();
  while *pos < bytes.len() {
    if bytes[*pos] != b'<' {
      let start = *pos;
      while *pos < bytes.len() && bytes[*pos] != b'<' {
        *pos += 1;
      }
      nodes.push(Node::Text(unescape_html(&html[start..*pos])));
      continue;
    }

    if html[*pos..].starts_with("</") {
      if let Some(parent) = parent_tag {
        let expected = format!("</{parent}>");
        if html[*pos..].starts_with(&expected) {
          *pos += expected.len();
          return nodes;
        }
      }
      // Stray closing tag ends the current level
      skip_past(bytes, pos, b'>');
      return nodes;
    }

    if html[*pos..].starts_with("<!--") {
      *pos = html[*pos..].find("-->").map_or(bytes.len(), |end| *pos + end + 3);
      continue;
    }

    // Doctype and other declarations carry no structure
    if html[*pos..].starts_with("<!") {
      skip_past(bytes, pos, b'>');
      continue;
    }

    nodes.push(Node::Element(parse_element(html, pos)));
  }
  nodes
}

fn skip_past(bytes: &[u8], pos: &mut usize, delim: u8) {
  while *pos < bytes.len() && bytes[*pos] != delim {
    *pos += 1;
  }
  if *pos < bytes.len() {
    *pos += 1;
  }
}

fn parse_element(html: &str, pos: &mut usize) -> Element {
  let bytes = html.as_bytes();
  *pos += 1;
  let tag_start = *pos;
  while *pos < bytes.len()
    && !bytes[*pos].is_ascii_whitespace()
    && bytes[*pos] != b'>'
    && bytes[*pos] != b'/'
  {
    *pos += 1;
  }
  let tag = html[tag_start..*pos].to_ascii_lowercase();

  // Quote-aware scan for '>' or '/>'
  let attrs_start = *pos;
  let mut in_quote: Option<u8> = None;
  let mut self_closed = false;
  while *pos < bytes.len() {
    let b = bytes[*pos];
    match in_quote {
      Some(q) if b == q => in_quote = None,
      Some(_) => {}
      None if b == b'"' || b == b'\'' => in_quote = Some(b),
      None if b == b'/' && bytes.get(*pos + 1) == Some(&b'>') => {
        self_closed = true;
        break;
      }
      None if b == b'>' => break,
      None => {}
    }
    *pos += 1;
  }
  let attrs = parse_attrs(&html[attrs_start..*pos]);
  *pos = (*pos + if self_closed { 2 } else { 1 }).min(bytes.len());

  let children = if self_closed || VOID_ELEMENTS.contains(&tag.as_str()) {
    Vec::new()
  } else {
    let mut kids = parse_nodes(html, pos, Some(&tag));
    merge_adjacent_text(&mut kids);
    kids
  };
  Element { tag, attrs, children }
}

/// Handles `key="value"`, `key='value'`, unquoted values and bare flags.
fn parse_attrs(raw: &str) -> Vec<(String, String)> {
  let bytes = raw.as_bytes();
  let mut attrs: Vec<(String, String)> = Vec::new();
  let mut i = 0;
  loop {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
      i += 1;
    }
    let key_start = i;
    while i < bytes.len() && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() && bytes[i] != b'/'
    {
      i += 1;
    }
    if i == key_start {
      break;
    }
    let key = raw[key_start..i].to_ascii_lowercase();

    let value = if bytes.get(i) == Some(&b'=') {
      i += 1;
      match bytes.get(i) {
        Some(&q) if q == b'"' || q == b'\'' => {
          i += 1;
          let start = i;
          while i < bytes.len() && bytes[i] != q {
            i += 1;
          }
          let value = &raw[start..i];
          i = (i + 1).min(bytes.len());
          value
        }
        _ => {
          let start = i;
          while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
          }
          &raw[start..i]
        }
      }
    } else {
      ""
    };

    if !attrs.iter().any(|(k, _)| *k == key) {
      attrs.push((key, unescape_html(value)));
    }
  }
  attrs
}

fn merge_adjacent_text(nodes: &mut Vec<Node>) {
  let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
  for node in nodes.drain(..) {
    if let Node::Text(next) = &node {
      if next.is_empty() {
        continue;
      }
      if let Some(Node::Text(prev)) = merged.last_mut() {
        prev.push_str(next);
        continue;
      }
    }
    merged.push(node);
  }
  *nodes = merged;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::markup::{el, text};

  #[test]
  fn parses_nested_elements() {
    let nodes = parse_markup(r#"<div class="red"><span>hello</span> world</div>"#);
    let expected: Node =
      el("div").class("red").child(el("span").child("hello")).child(" world").into();
    assert_eq!(nodes, vec![expected]);
  }

  #[test]
  fn decodes_entities_in_text_and_attrs() {
    let nodes = parse_markup(r#"<a title="&quot;x&quot; &amp; y">1 &lt; 2</a>"#);
    let expected: Node = el("a").attr("title", r#""x" & y"#).child("1 < 2").into();
    assert_eq!(nodes, vec![expected]);
  }

  #[test]
  fn comments_dropped_and_text_merged() {
    let nodes = parse_markup("<p>by <!-- -->Alice</p><!--tail-->");
    assert_eq!(nodes, vec![Node::from(el("p").child("by Alice"))]);
  }

  #[test]
  fn void_and_self_closed_elements() {
    let nodes = parse_markup(r#"<br><img src="x"><input type="text"/>after"#);
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[3], text("after"));
    for node in &nodes[..3] {
      match node {
        Node::Element(e) => assert!(e.children.is_empty()),
        other => panic!("expected element, got {other:?}"),
      }
    }
  }

  #[test]
  fn quoted_angle_bracket_and_bare_attr() {
    let nodes = parse_markup(r#"<input disabled data-x="a>b">"#);
    let Node::Element(input) = &nodes[0] else { panic!("expected element") };
    assert_eq!(input.get_attr("disabled"), Some(""));
    assert_eq!(input.get_attr("data-x"), Some("a>b"));
  }

  #[test]
  fn doctype_skipped() {
    let nodes = parse_markup("<!DOCTYPE html><p>x</p>");
    assert_eq!(nodes, vec![Node::from(el("p").child("x"))]);
  }

  #[test]
  fn serialized_tree_parses_back() {
    let tree: Node = el("ul")
      .class("items")
      .children(["a & b", "c"].iter().map(|s| el("li").child(*s)))
      .child(el("img").attr("src", "/x.png").attr("alt", "<x>"))
      .into();
    assert_eq!(parse_markup(&tree.to_html()), vec![tree]);
  }
}
