//! Record-type capabilities consumed by the builder, compiler and indexers
//!
//! A searchable record type is described twice: once at the type level
//! ([`SearchableModel`]: index, rules, mapping) and once per record
//! ([`SearchableRecord`]: key and indexed document). Records are loaded back
//! from the application's store through a [`RecordProvider`].

mod highlight;

pub use highlight::Highlight;

use crate::error::{Result, ScoutError};
use crate::rules::SearchRule;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Marker field holding 1 for trashed records and 0 otherwise.
pub const SOFT_DELETED_FIELD: &str = "__soft_deleted";

/// Describes the search index a record type is stored in.
pub trait IndexConfigurator: Send + Sync {
    fn name(&self) -> String;

    fn settings(&self) -> Value {
        json!({})
    }

    /// Migratable indexes are written through the `{name}_write` alias.
    fn is_migratable(&self) -> bool {
        false
    }
}

/// Type-level search capabilities of a record type.
pub trait SearchableModel: Send + Sync {
    /// Name of the record type, used as the payload `type`.
    fn searchable_as(&self) -> String;

    fn scout_key_name(&self) -> String {
        "id".to_string()
    }

    fn index_configurator(&self) -> Option<Arc<dyn IndexConfigurator>>;

    fn uses_soft_delete(&self) -> bool {
        false
    }

    /// Rules applied to search-mode builders that declare none. An empty list
    /// falls back to a single query-string rule.
    fn search_rules(&self) -> Vec<SearchRule> {
        Vec::new()
    }

    /// Index mapping pushed once per process when mapping updates are on.
    fn mapping(&self) -> Value {
        json!({})
    }
}

/// Per-record search capabilities.
pub trait SearchableRecord {
    fn scout_key(&self) -> Value;

    fn to_searchable_array(&self) -> Map<String, Value>;

    fn scout_metadata(&self) -> Map<String, Value> {
        Map::new()
    }

    fn is_trashed(&self) -> bool {
        false
    }
}

pub(crate) fn require_configurator(
    model: &dyn SearchableModel,
) -> Result<Arc<dyn IndexConfigurator>> {
    model
        .index_configurator()
        .ok_or_else(|| ScoutError::MissingIndexConfigurator {
            model: model.searchable_as(),
        })
}

/// Lookup handed to a [`RecordProvider`] when mapping hits back to records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Key column the ids refer to
    pub key_name: String,

    /// Ids in hit order
    pub ids: Vec<Value>,

    /// Columns to load; `None` loads everything
    pub columns: Option<Vec<String>>,

    /// Include soft-deleted records
    pub with_trashed: bool,

    /// Relations to eager load
    pub relations: Vec<String>,
}

/// Source of domain records (usually backed by the application's database).
pub trait RecordProvider {
    /// Cloned when several hits share one key.
    type Record: SearchableRecord + Clone;

    fn fetch(&self, query: &RecordQuery) -> Result<Vec<Self::Record>>;
}

/// A record matched by a search, with the hit metadata it came with.
#[derive(Debug, Clone)]
pub struct ScoredRecord<R> {
    pub record: R,

    /// Relevance score, only when the builder asked for scores
    pub score: Option<f64>,

    pub highlight: Option<Highlight>,

    /// Sort values of the hit (for search_after style paging)
    pub sort: Option<Value>,
}

impl<R> ScoredRecord<R> {
    pub fn new(record: R) -> Self {
        Self {
            record,
            score: None,
            highlight: None,
            sort: None,
        }
    }
}

/// String form of a key value, used to match records against hit ids.
pub(crate) fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Untyped;

    impl SearchableModel for Untyped {
        fn searchable_as(&self) -> String {
            "untyped".to_string()
        }

        fn index_configurator(&self) -> Option<Arc<dyn IndexConfigurator>> {
            None
        }
    }

    #[test]
    fn test_missing_configurator_is_config_error() {
        let err = require_configurator(&Untyped).err().unwrap();
        assert_eq!(
            err.to_string(),
            "An index configurator for the untyped model is not specified."
        );
    }

    #[test]
    fn test_key_string() {
        assert_eq!(key_string(&json!(12)), Some("12".to_string()));
        assert_eq!(key_string(&json!("ab")), Some("ab".to_string()));
        assert_eq!(key_string(&json!(null)), None);
    }
}
