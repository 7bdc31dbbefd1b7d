//! Document indexing strategies
//!
//! [`SingleIndexer`] issues one request per record; [`BulkIndexer`] sends a
//! whole batch in one bulk request and turns per-item failures into a single
//! chained [`ScoutError::Bulk`].

mod bulk;
mod single;

pub use bulk::BulkIndexer;
pub use single::SingleIndexer;

use crate::error::{BulkItemError, Result, ScoutError};
use crate::model::{SearchableModel, SearchableRecord, SOFT_DELETED_FIELD};
use crate::transport::Transport;
use serde_json::{json, Map, Value};

/// Pushes records of one type into (or out of) their index.
pub trait Indexer: Send + Sync {
    fn update(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()>;

    fn delete(
        &self,
        transport: &dyn Transport,
        model: &dyn SearchableModel,
        records: &[&dyn SearchableRecord],
    ) -> Result<()>;
}

/// Settings shared by both indexers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexerOptions {
    /// `refresh` parameter sent with writes (`true`, `false` or `wait_for`)
    pub document_refresh: Option<String>,

    /// Write the soft-deleted marker for types that use soft delete
    pub soft_delete: bool,
}

/// Indexed document: searchable array, then metadata (metadata wins on
/// collisions), including the soft-deleted marker when enabled.
pub(crate) fn searchable_document(
    model: &dyn SearchableModel,
    record: &dyn SearchableRecord,
    options: &IndexerOptions,
) -> Map<String, Value> {
    let mut metadata = record.scout_metadata();
    if model.uses_soft_delete() && options.soft_delete {
        let marker = if record.is_trashed() { 1 } else { 0 };
        metadata.insert(SOFT_DELETED_FIELD.to_string(), json!(marker));
    }

    let mut document = record.to_searchable_array();
    document.extend(metadata);
    document
}

/// Chain every failed item of a bulk response. `None` unless the response
/// reports `errors: true`.
pub(crate) fn bulk_failure(response: &Value) -> Option<ScoutError> {
    if response.get("errors") != Some(&Value::Bool(true)) {
        return None;
    }

    let items = response
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut chained: Option<BulkItemError> = None;
    let mut failed = 0;
    for item in items {
        // Each item is `{<operation>: {..., error?}}`
        let Some(error) = item
            .as_object()
            .and_then(|ops| ops.values().next())
            .and_then(|op| op.get("error"))
        else {
            continue;
        };

        failed += 1;
        chained = Some(BulkItemError {
            error_type: error_field(error, "type"),
            reason: error_field(error, "reason"),
            previous: chained.map(Box::new),
        });
    }

    tracing::warn!(
        "Bulk request reported {} failed item(s) out of {}",
        failed,
        items.len()
    );
    Some(ScoutError::Bulk { source: chained })
}

fn error_field(error: &Value, key: &str) -> String {
    match error.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
