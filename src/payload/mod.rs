//! Request payload documents
//!
//! A payload is a JSON tree addressed by dot-delimited paths (`body.query.bool`).
//! Missing intermediate segments are created on write and yield the default on
//! read. Numeric segments index into sequences.
//!
//! ```
//! use scout_elastic::payload::{PayloadDocument, RawPayload};
//! use serde_json::json;
//!
//! let mut payload = RawPayload::new();
//! payload
//!     .set("body.query.bool.must.match_all", json!({}))
//!     .set_if_not_empty("body.sort", json!([]))
//!     .set_if_not_null("body.from", 0);
//!
//! assert_eq!(
//!     payload.to_value(),
//!     json!({"body": {"query": {"bool": {"must": {"match_all": {}}}}, "from": 0}})
//! );
//! ```

mod index;

pub use index::{DocumentPayload, IndexPayload, TypePayload};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path-addressed document operations shared by every payload kind.
///
/// Implementors only expose their tree; protected keys (for example `index`
/// on index payloads) silently refuse `set`, `add` and `unset`.
pub trait PayloadDocument {
    fn tree(&self) -> &Value;

    fn tree_mut(&mut self) -> &mut Value;

    fn is_protected(&self, _key: &str) -> bool {
        false
    }

    fn get(&self, key: &str) -> Option<&Value> {
        lookup(self.tree(), key)
    }

    /// Cloned value at `key`, or `default` when absent.
    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        if self.is_protected(key) {
            tracing::debug!("Ignoring write to protected payload key: {}", key);
            return self;
        }
        assign(self.tree_mut(), key, value.into());
        self
    }

    /// Set only when the value is not empty (null, false, 0, "", "0", [] and {} are empty).
    fn set_if_not_empty(&mut self, key: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        let value = value.into();
        if is_empty_value(&value) {
            return self;
        }
        self.set(key, value)
    }

    /// Set only when the value is present; zero, false and "" are kept.
    fn set_if_not_null(&mut self, key: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        let value = value.into();
        if value.is_null() {
            return self;
        }
        self.set(key, value)
    }

    /// Append to the sequence at `key`. A non-sequence value already there is
    /// wrapped into a single-element sequence first.
    fn add(&mut self, key: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        if self.is_protected(key) {
            tracing::debug!("Ignoring append to protected payload key: {}", key);
            return self;
        }
        let mut items = match self.get(key).cloned() {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
        };
        items.push(value.into());
        assign(self.tree_mut(), key, Value::Array(items));
        self
    }

    fn add_if_not_empty(&mut self, key: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        let value = value.into();
        if is_empty_value(&value) {
            return self;
        }
        self.add(key, value)
    }

    fn unset(&mut self, key: &str) -> &mut Self
    where
        Self: Sized,
    {
        if self.is_protected(key) {
            tracing::debug!("Ignoring removal of protected payload key: {}", key);
            return self;
        }
        remove(self.tree_mut(), key);
        self
    }

    fn to_value(&self) -> Value {
        self.tree().clone()
    }
}

/// Plain payload document with no protected keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload {
    payload: Value,
}

impl RawPayload {
    pub fn new() -> Self {
        Self {
            payload: Value::Object(Map::new()),
        }
    }

    /// Wrap an existing tree. Non-object roots are replaced by an empty mapping.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self { payload: value },
            _ => Self::new(),
        }
    }

    pub fn into_value(self) -> Value {
        self.payload
    }
}

impl Default for RawPayload {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadDocument for RawPayload {
    fn tree(&self) -> &Value {
        &self.payload
    }

    fn tree_mut(&mut self) -> &mut Value {
        &mut self.payload
    }
}

/// Emptiness as the payload helpers understand it.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

pub(crate) fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    // A literal top-level key wins over path walking
    if let Value::Object(map) = root {
        if let Some(value) = map.get(key) {
            return Some(value);
        }
    }

    let mut current = root;
    for segment in key.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn lookup_mut<'a>(root: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in key.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Child slot for `segment`, creating (or overwriting scalars with) mappings on the way.
fn entry<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match &*node {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .filter(|i| *i <= items.len()),
        _ => None,
    };

    if index.is_none() && !node.is_object() {
        *node = Value::Object(Map::new());
    }

    match node {
        Value::Array(items) => {
            let i = index.unwrap_or(items.len());
            if i == items.len() {
                items.push(Value::Null);
            }
            &mut items[i]
        }
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        other => other,
    }
}

fn assign(root: &mut Value, key: &str, value: Value) {
    let mut current = root;
    for segment in key.split('.') {
        current = entry(current, segment);
    }
    *current = value;
}

fn remove(root: &mut Value, key: &str) {
    if let Value::Object(map) = root {
        if map.contains_key(key) {
            map.shift_remove(key);
            return;
        }
    }

    let (parent, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (lookup_mut(root, parent), last),
        None => (Some(root), key),
    };

    match parent {
        Some(Value::Object(map)) => {
            map.shift_remove(last);
        }
        Some(Value::Array(items)) => {
            if let Ok(i) = last.parse::<usize>() {
                if i < items.len() {
                    items.remove(i);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_segments() {
        let mut payload = RawPayload::new();
        payload.set("body.query.bool.filter", json!([1]));
        assert_eq!(
            payload.to_value(),
            json!({"body": {"query": {"bool": {"filter": [1]}}}})
        );
    }

    #[test]
    fn test_set_overwrites_scalar_on_path() {
        let mut payload = RawPayload::new();
        payload.set("a", 1).set("a.b", 2);
        assert_eq!(payload.to_value(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_get_missing_returns_default() {
        let payload = RawPayload::new();
        assert!(payload.get("body.query").is_none());
        assert_eq!(payload.get_or("body.query", json!([])), json!([]));
    }

    #[test]
    fn test_get_indexes_sequences() {
        let payload = RawPayload::from_value(json!({"body": [{"a": 1}, {"a": 2}]}));
        assert_eq!(payload.get("body.1.a"), Some(&json!(2)));
        assert!(payload.get("body.5.a").is_none());
    }

    #[test]
    fn test_literal_dotted_key_is_read_first() {
        let payload = RawPayload::from_value(json!({"a.b": 1, "a": {"b": 2}}));
        assert_eq!(payload.get("a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_add_appends_and_wraps_scalar() {
        let mut payload = RawPayload::new();
        payload.add("body", json!({"index": {"_id": 1}}));
        payload.add("body", json!({"name": "foo"}));
        assert_eq!(
            payload.get("body"),
            Some(&json!([{"index": {"_id": 1}}, {"name": "foo"}]))
        );

        payload.set("tags", "one").add("tags", "two");
        assert_eq!(payload.get("tags"), Some(&json!(["one", "two"])));
    }

    #[test]
    fn test_set_if_not_empty_skips_empty_values() {
        let mut payload = RawPayload::new();
        payload
            .set_if_not_empty("a", json!([]))
            .set_if_not_empty("b", json!({}))
            .set_if_not_empty("c", 0)
            .set_if_not_empty("d", "")
            .set_if_not_empty("e", false)
            .set_if_not_empty("f", Value::Null)
            .set_if_not_empty("g", "0")
            .set_if_not_empty("h", json!(["x"]));
        assert_eq!(payload.to_value(), json!({"h": ["x"]}));
    }

    #[test]
    fn test_set_if_not_null_keeps_falsy_values() {
        let mut payload = RawPayload::new();
        payload
            .set_if_not_null("from", 0)
            .set_if_not_null("flag", false)
            .set_if_not_null("name", "")
            .set_if_not_null("size", None::<u64>);
        assert_eq!(payload.to_value(), json!({"from": 0, "flag": false, "name": ""}));
    }

    #[test]
    fn test_add_if_not_empty() {
        let mut payload = RawPayload::new();
        payload.add_if_not_empty("items", json!({})).add_if_not_empty("items", 3);
        assert_eq!(payload.get("items"), Some(&json!([3])));
    }

    #[test]
    fn test_unset_and_has() {
        let mut payload = RawPayload::from_value(json!({"body": {"query": {"x": 1}, "size": 5}}));
        assert!(payload.has("body.query.x"));
        payload.unset("body.query");
        assert!(!payload.has("body.query"));
        assert_eq!(payload.to_value(), json!({"body": {"size": 5}}));

        // missing intermediates are a no-op
        payload.unset("nothing.here");
        assert_eq!(payload.to_value(), json!({"body": {"size": 5}}));
    }

    #[test]
    fn test_null_is_present_for_has() {
        let payload = RawPayload::from_value(json!({"a": null}));
        assert!(payload.has("a"));
    }
}
