//! Search backend collaborator
//!
//! The core never talks HTTP itself. Every request goes through a
//! [`Transport`], with payloads and responses in the engine's native JSON
//! wire format.

mod memory;

pub use memory::{MemoryTransport, Operation};

use crate::error::Result;
use serde_json::Value;

/// Client calls the engine and indexers issue.
pub trait Transport: Send + Sync {
    /// `{index, type, body}` search request; response carries `hits`.
    fn search(&self, payload: &Value) -> Result<Value>;

    /// Same payload as search; response carries `count`.
    fn count(&self, payload: &Value) -> Result<Value>;

    /// Index a single document (`{index, type, id, body}`).
    fn index(&self, payload: &Value) -> Result<Value>;

    /// Delete a single document (`{index, type, id}`).
    fn delete(&self, payload: &Value) -> Result<Value>;

    /// Bulk request; response carries `errors` and `items`.
    fn bulk(&self, payload: &Value) -> Result<Value>;

    /// Update the index mapping.
    fn put_mapping(&self, payload: &Value) -> Result<Value>;
}
