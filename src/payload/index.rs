// Index-scoped payloads: the `index` key (and `type`/`id` for the narrower
// kinds) is fixed at construction and cannot be overwritten through `set`.

use super::PayloadDocument;
use crate::error::Result;
use crate::model::{require_configurator, IndexConfigurator, SearchableModel, SearchableRecord};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Payload targeting the index named by an [`IndexConfigurator`].
#[derive(Clone)]
pub struct IndexPayload {
    payload: Value,
    protected_keys: Vec<&'static str>,
    configurator: Arc<dyn IndexConfigurator>,
}

impl IndexPayload {
    pub fn new(configurator: Arc<dyn IndexConfigurator>) -> Self {
        let mut payload = Map::new();
        payload.insert("index".to_string(), Value::String(configurator.name()));

        Self {
            payload: Value::Object(payload),
            protected_keys: vec!["index"],
            configurator,
        }
    }

    /// Point the payload at `{name}_{alias}`. Always derived from the base
    /// name, so repeating the call with the same alias is a no-op.
    pub fn use_alias(&mut self, alias: &str) -> &mut Self {
        let name = format!("{}_{}", self.configurator.name(), alias);
        self.put("index", Value::String(name));
        self
    }

    pub fn configurator(&self) -> &Arc<dyn IndexConfigurator> {
        &self.configurator
    }

    pub fn into_value(self) -> Value {
        self.payload
    }

    fn protect(&mut self, key: &'static str, value: Value) {
        self.put(key, value);
        self.protected_keys.push(key);
    }

    fn put(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.payload {
            map.insert(key.to_string(), value);
        }
    }
}

impl PayloadDocument for IndexPayload {
    fn tree(&self) -> &Value {
        &self.payload
    }

    fn tree_mut(&mut self) -> &mut Value {
        &mut self.payload
    }

    fn is_protected(&self, key: &str) -> bool {
        self.protected_keys.iter().any(|k| *k == key)
    }
}

impl std::fmt::Debug for IndexPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexPayload")
            .field("payload", &self.payload)
            .field("protected_keys", &self.protected_keys)
            .finish()
    }
}

/// Index payload carrying the record type name under `type`.
#[derive(Debug, Clone)]
pub struct TypePayload {
    inner: IndexPayload,
}

impl TypePayload {
    /// Fails when the record type has no index configurator.
    pub fn new(model: &dyn SearchableModel) -> Result<Self> {
        let mut inner = IndexPayload::new(require_configurator(model)?);
        inner.protect("type", Value::String(model.searchable_as()));
        Ok(Self { inner })
    }

    pub fn use_alias(&mut self, alias: &str) -> &mut Self {
        self.inner.use_alias(alias);
        self
    }

    pub fn configurator(&self) -> &Arc<dyn IndexConfigurator> {
        self.inner.configurator()
    }

    pub fn into_value(self) -> Value {
        self.inner.into_value()
    }
}

impl PayloadDocument for TypePayload {
    fn tree(&self) -> &Value {
        self.inner.tree()
    }

    fn tree_mut(&mut self) -> &mut Value {
        self.inner.tree_mut()
    }

    fn is_protected(&self, key: &str) -> bool {
        self.inner.is_protected(key)
    }
}

/// Type payload addressing a single document by its scout key.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    inner: TypePayload,
}

impl DocumentPayload {
    pub fn new(model: &dyn SearchableModel, record: &dyn SearchableRecord) -> Result<Self> {
        let mut inner = TypePayload::new(model)?;
        inner.inner.protect("id", record.scout_key());
        Ok(Self { inner })
    }

    pub fn use_alias(&mut self, alias: &str) -> &mut Self {
        self.inner.use_alias(alias);
        self
    }

    pub fn configurator(&self) -> &Arc<dyn IndexConfigurator> {
        self.inner.configurator()
    }

    pub fn into_value(self) -> Value {
        self.inner.into_value()
    }
}

impl PayloadDocument for DocumentPayload {
    fn tree(&self) -> &Value {
        self.inner.tree()
    }

    fn tree_mut(&mut self) -> &mut Value {
        self.inner.tree_mut()
    }

    fn is_protected(&self, key: &str) -> bool {
        self.inner.is_protected(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NamedIndex(&'static str);

    impl IndexConfigurator for NamedIndex {
        fn name(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_default_index_name() {
        let payload = IndexPayload::new(Arc::new(NamedIndex("test")));
        assert_eq!(payload.to_value(), json!({"index": "test"}));
    }

    #[test]
    fn test_index_key_is_protected() {
        let mut payload = IndexPayload::new(Arc::new(NamedIndex("foo")));
        payload
            .set("index", "bar")
            .set("settings", json!({"key": "value"}))
            .unset("index");

        assert_eq!(
            payload.to_value(),
            json!({"index": "foo", "settings": {"key": "value"}})
        );
    }

    #[test]
    fn test_use_alias_is_idempotent() {
        let mut payload = IndexPayload::new(Arc::new(NamedIndex("foo")));
        payload.use_alias("write");
        assert_eq!(payload.to_value(), json!({"index": "foo_write"}));

        payload.use_alias("write");
        assert_eq!(payload.to_value(), json!({"index": "foo_write"}));
    }
}
