/* src/core/rust/src/payload.rs */

//! Serialization Boundary: the PageData bag as script-embeddable JSON text.

use tandem_engine::escape_script_json;

use crate::data::PageData;
use crate::errors::{Result, TandemError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
  /// Escape every non-ASCII character as well.
  pub ascii_only: bool,
}

/// Encode a bag for verbatim placement inside a `<script>` element.
pub fn encode_page_data(data: &PageData, options: EncodeOptions) -> Result<String> {
  let json = serde_json::to_string(data)?;
  Ok(escape_script_json(&json, options.ascii_only))
}

/// Structural decode of an embedded blob. No content validation happens
/// here; typed record access validates later.
pub fn decode_page_data(blob: &str) -> Result<PageData> {
  let value: serde_json::Value =
    serde_json::from_str(blob.trim()).map_err(|e| TandemError::MalformedPayload(e.to_string()))?;
  PageData::from_value(value)
}
