/* src/engine/rust/src/document.rs */

//! Document assembly and the inverse extraction used by the client.
//!
//! The document layout is fixed: head holds the collected metadata followed
//! by style references, body holds the root container, then one inline
//! script assigning the data blob to [`GLOBAL_DATA_KEY`], then the ordered
//! script references.

use serde::{Deserialize, Serialize};

use crate::escape::escape_html;

/// Global identifier the embedded data blob is assigned to.
pub const GLOBAL_DATA_KEY: &str = "window.__INITIAL_DATA__";

/// `id` of the container element holding the rendered view tree.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
  Script,
  Style,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
  pub kind: AssetKind,
  pub href: String,
  /// Style only: wrap in `<noscript>` so it applies when scripts do not run.
  #[serde(default)]
  pub noscript: bool,
}

impl AssetRef {
  pub fn script(href: impl Into<String>) -> Self {
    Self { kind: AssetKind::Script, href: href.into(), noscript: false }
  }

  pub fn style(href: impl Into<String>, noscript: bool) -> Self {
    Self { kind: AssetKind::Style, href: href.into(), noscript }
  }
}

/// Output of one server render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedPayload {
  pub markup: String,
  pub metadata_tags: String,
  /// Attributes of the `<html>` element, in output order.
  pub html_attrs: Vec<(String, String)>,
  /// Script-safe JSON text of the page data bag.
  pub data_blob: String,
  pub assets: Vec<AssetRef>,
}

impl SerializedPayload {
  pub fn to_document(&self) -> String {
    let mut doc = String::with_capacity(self.markup.len() + self.data_blob.len() + 512);
    doc.push_str("<!DOCTYPE html><html");
    for (name, value) in &self.html_attrs {
      doc.push_str(&format!(r#" {name}="{}""#, escape_html(value)));
    }
    doc.push_str(r#"><head><meta charset="utf-8">"#);
    doc.push_str(&self.metadata_tags);
    for asset in self.assets.iter().filter(|a| a.kind == AssetKind::Style) {
      let link = format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(&asset.href));
      if asset.noscript {
        doc.push_str(&format!("<noscript>{link}</noscript>"));
      } else {
        doc.push_str(&link);
      }
    }
    doc.push_str("</head><body>");
    doc.push_str(&format!(r#"<div id="{ROOT_ID}">"#));
    doc.push_str(&self.markup);
    doc.push_str("</div><script>");
    doc.push_str(GLOBAL_DATA_KEY);
    doc.push('=');
    doc.push_str(&self.data_blob);
    doc.push_str(";</script>");
    for asset in self.assets.iter().filter(|a| a.kind == AssetKind::Script) {
      doc.push_str(&format!(r#"<script src="{}"></script>"#, escape_html(&asset.href)));
    }
    doc.push_str("</body></html>");
    doc
  }
}

/// Overlay `overrides` onto `defaults`: matching names take the override
/// value in place, new names are appended.
pub fn merge_html_attrs(
  defaults: &[(String, String)],
  overrides: &[(String, String)],
) -> Vec<(String, String)> {
  let mut merged = defaults.to_vec();
  for (name, value) in overrides {
    match merged.iter_mut().find(|(n, _)| n == name) {
      Some(slot) => slot.1.clone_from(value),
      None => merged.push((name.clone(), value.clone())),
    }
  }
  merged
}

fn data_marker() -> String {
  format!("<script>{GLOBAL_DATA_KEY}=")
}

/// Locate the embedded data blob in a document produced by
/// [`SerializedPayload::to_document`].
pub fn extract_data_blob(document: &str) -> Option<&str> {
  let marker = data_marker();
  let start = document.find(&marker)? + marker.len();
  let len = document[start..].find(";</script>")?;
  Some(&document[start..start + len])
}

/// Inner markup of the root container.
pub fn extract_root_markup(document: &str) -> Option<&str> {
  let open = format!(r#"<div id="{ROOT_ID}">"#);
  let start = document.find(&open)? + open.len();
  let close = format!("</div>{}", data_marker());
  let len = document[start..].find(&close)?;
  Some(&document[start..start + len])
}
