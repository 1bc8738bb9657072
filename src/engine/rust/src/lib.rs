/* src/engine/rust/src/lib.rs */

pub mod diff;
pub mod document;
pub mod escape;
pub mod head;
pub mod markup;
pub mod parse;

pub use diff::{DiffReport, MarkupDiff, diff_markup};
pub use document::{
  AssetKind, AssetRef, GLOBAL_DATA_KEY, ROOT_ID, SerializedPayload, extract_data_blob,
  extract_root_markup, merge_html_attrs,
};
pub use escape::{escape_html, escape_script_json, unescape_html};
pub use head::{HeadCollector, HeadTags};
pub use markup::{Element, Node, el, fragment, text};
pub use parse::parse_markup;
