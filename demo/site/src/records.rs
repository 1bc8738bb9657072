/* demo/site/src/records.rs */

use serde::{Deserialize, Serialize};
use tandem_core::Record;

/// Notification kinds the stylesheet knows about. Configured
/// `notification.types` must be a subset of these.
pub const NOTIFICATION_TYPES: [&str; 4] = ["error", "success", "info", "warning"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub description: String,
  pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub title: String,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Metadata>,
}

impl Record for Page {
  const KEY: &'static str = "page";

  fn validate(&self) -> Result<(), String> {
    if self.title.trim().is_empty() {
      return Err("title must not be empty".into());
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
  pub id: u32,
  pub name: String,
  pub items: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Metadata>,
}

impl Record for Service {
  const KEY: &'static str = "service";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub message: String,
  #[serde(rename = "type")]
  pub kind: String,
}

impl Record for Notification {
  const KEY: &'static str = "notification";

  /// Checks against the full set of known kinds, the upper bound of any
  /// configured list.
  fn validate(&self) -> Result<(), String> {
    if NOTIFICATION_TYPES.contains(&self.kind.as_str()) {
      Ok(())
    } else {
      Err(format!("unknown notification type {:?}", self.kind))
    }
  }
}
