/* src/client/rust/src/bootstrap.rs */

use tandem_core::{PageData, Result, TandemError, decode_page_data};
use tandem_engine::extract_data_blob;

/// The data blob the server embedded in the document.
///
/// Decoded at most once: the first [`take`](Self::take) hands the bag to the
/// caller, every later call fails with `PayloadConsumed`.
#[derive(Debug)]
pub struct EmbeddedPayload {
  blob: Option<String>,
}

impl EmbeddedPayload {
  pub fn from_blob(blob: impl Into<String>) -> Self {
    Self { blob: Some(blob.into()) }
  }

  pub fn from_document(document: &str) -> Result<Self> {
    extract_data_blob(document)
      .map(Self::from_blob)
      .ok_or_else(|| TandemError::MalformedPayload("document has no embedded data".into()))
  }

  pub fn is_consumed(&self) -> bool {
    self.blob.is_none()
  }

  pub fn take(&mut self) -> Result<PageData> {
    let blob = self.blob.take().ok_or(TandemError::PayloadConsumed)?;
    decode_page_data(&blob)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_exactly_once() {
    let mut payload = EmbeddedPayload::from_blob(r#"{"page":{"title":"Home"}}"#);
    let data = payload.take().unwrap();
    assert_eq!(data.get("page").unwrap()["title"], "Home");
    assert!(payload.is_consumed());
    assert_eq!(payload.take().unwrap_err(), TandemError::PayloadConsumed);
  }

  #[test]
  fn reads_blob_from_document() {
    let doc = concat!(
      r#"<html><body><div id="root"><p>x</p></div>"#,
      r#"<script>window.__INITIAL_DATA__={"a":1};</script></body></html>"#
    );
    let mut payload = EmbeddedPayload::from_document(doc).unwrap();
    assert_eq!(payload.take().unwrap().get("a"), Some(&serde_json::json!(1)));
  }

  #[test]
  fn document_without_payload() {
    let err = EmbeddedPayload::from_document("<html></html>").unwrap_err();
    assert!(matches!(err, TandemError::MalformedPayload(_)));
  }

  #[test]
  fn malformed_blob_surfaces_on_take() {
    let mut payload = EmbeddedPayload::from_blob("{oops");
    assert!(matches!(payload.take(), Err(TandemError::MalformedPayload(_))));
    assert!(payload.is_consumed());
  }
}
