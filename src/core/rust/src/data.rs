/* src/core/rust/src/data.rs */

//! The PageData bag: an open map of keyed records.
//!
//! Values are kept as JSON so the bag round-trips through the embedded
//! payload unchanged; typed access goes through [`Record`], which carries the
//! key and the required-field contract of one application record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, TandemError};

/// An application record stored under a fixed key.
///
/// Required fields are enforced by deserialization; `validate` adds any
/// contract serde cannot express.
pub trait Record: Serialize + DeserializeOwned {
  const KEY: &'static str;

  fn validate(&self) -> Result<(), String> {
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageData(Map<String, Value>);

impl PageData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Interpret a JSON value as a bag. Only objects qualify.
  pub fn from_value(value: Value) -> Result<Self> {
    match value {
      Value::Object(map) => Ok(Self(map)),
      other => Err(TandemError::MalformedPayload(format!(
        "expected an object, got {}",
        json_kind(&other)
      ))),
    }
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
    self.0.insert(key.into(), value)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Union with `other`; on key conflict `other` wins.
  pub fn merge(&mut self, other: PageData) {
    self.0.extend(other.0);
  }

  pub fn insert_record<R: Record>(&mut self, record: &R) -> Result<()> {
    let value = serde_json::to_value(record)?;
    self.0.insert(R::KEY.to_string(), value);
    Ok(())
  }

  pub fn with_record<R: Record>(mut self, record: &R) -> Result<Self> {
    self.insert_record(record)?;
    Ok(self)
  }

  /// Typed read. `Ok(None)` when the key is absent or null, `InvalidData`
  /// when present but violating the record contract.
  pub fn record<R: Record>(&self) -> Result<Option<R>> {
    match self.0.get(R::KEY) {
      None | Some(Value::Null) => Ok(None),
      Some(value) => {
        let record = R::deserialize(value).map_err(|e| invalid::<R>(e.to_string()))?;
        record.validate().map_err(invalid::<R>)?;
        Ok(Some(record))
      }
    }
  }

  /// Typed read of a record the caller cannot do without.
  pub fn require<R: Record>(&self) -> Result<R> {
    self.record()?.ok_or_else(|| TandemError::RecordMissing { key: R::KEY.to_string() })
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }
}

impl From<Map<String, Value>> for PageData {
  fn from(map: Map<String, Value>) -> Self {
    Self(map)
  }
}

impl FromIterator<(String, Value)> for PageData {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

fn invalid<R: Record>(message: String) -> TandemError {
  TandemError::InvalidData { key: R::KEY.to_string(), message }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// String form of an identifying field, so `7` and `"7"` compare equal.
pub fn identity_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Item {
    id: u32,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
  }

  impl Record for Item {
    const KEY: &'static str = "item";

    fn validate(&self) -> Result<(), String> {
      if self.name.is_empty() { Err("name must not be empty".into()) } else { Ok(()) }
    }
  }

  #[test]
  fn typed_record_roundtrip() {
    let item = Item { id: 7, name: "Widget".into(), tags: vec!["a".into(), "b".into()] };
    let bag = PageData::new().with_record(&item).unwrap();
    assert_eq!(bag.get("item"), Some(&json!({"id": 7, "name": "Widget", "tags": ["a", "b"]})));
    assert_eq!(bag.require::<Item>().unwrap(), item);
  }

  #[test]
  fn missing_required_field_is_invalid() {
    let mut bag = PageData::new();
    bag.insert("item", json!({"id": 7}));
    let err = bag.record::<Item>().unwrap_err();
    assert!(matches!(err, TandemError::InvalidData { ref key, .. } if key == "item"), "{err}");
  }

  #[test]
  fn validate_hook_applies() {
    let mut bag = PageData::new();
    bag.insert("item", json!({"id": 1, "name": ""}));
    assert!(matches!(bag.record::<Item>(), Err(TandemError::InvalidData { .. })));
  }

  #[test]
  fn absent_or_null_record() {
    let mut bag = PageData::new();
    assert_eq!(bag.record::<Item>().unwrap(), None);
    bag.insert("item", Value::Null);
    assert_eq!(bag.record::<Item>().unwrap(), None);
    assert!(matches!(bag.require::<Item>(), Err(TandemError::RecordMissing { key }) if key == "item"));
  }

  #[test]
  fn merge_is_union_later_wins() {
    let mut a: PageData = [("page".to_string(), json!(1)), ("x".to_string(), json!("a"))]
      .into_iter()
      .collect();
    let b: PageData = [("x".to_string(), json!("b")), ("notification".to_string(), json!({}))]
      .into_iter()
      .collect();
    a.merge(b);
    assert_eq!(a.len(), 3);
    assert_eq!(a.get("x"), Some(&json!("b")));
  }

  #[test]
  fn from_value_requires_object() {
    assert!(PageData::from_value(json!({"a": 1})).is_ok());
    let err = PageData::from_value(json!([1, 2])).unwrap_err();
    assert_eq!(err, TandemError::MalformedPayload("expected an object, got an array".into()));
  }

  #[test]
  fn identity_strings() {
    assert_eq!(identity_string(&json!(7)), Some("7".into()));
    assert_eq!(identity_string(&json!("7")), Some("7".into()));
    assert_eq!(identity_string(&json!(null)), None);
    assert_eq!(identity_string(&json!({"id": 1})), None);
  }
}
