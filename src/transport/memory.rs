use super::Transport;
use crate::error::{Result, ScoutError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Transport call kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Count,
    Index,
    Delete,
    Bulk,
    PutMapping,
}

impl Operation {
    /// Response used when nothing was queued for the call.
    fn default_response(self) -> Value {
        match self {
            Self::Search => json!({"hits": {"total": {"value": 0}, "hits": []}}),
            Self::Count => json!({"count": 0}),
            Self::Bulk => json!({"errors": false, "items": []}),
            Self::Index | Self::Delete => json!({"result": "ok"}),
            Self::PutMapping => json!({"acknowledged": true}),
        }
    }
}

#[derive(Default)]
struct State {
    requests: Vec<(Operation, Value)>,
    responses: VecDeque<(Operation, Result<Value>)>,
}

/// In-process transport that records every request and replays queued
/// responses in order.
///
/// A queued response is consumed by the first call of its operation kind;
/// calls with nothing queued get an empty-but-valid response.
#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `operation` call.
    pub fn respond(&self, operation: Operation, response: Value) -> &Self {
        self.lock().responses.push_back((operation, Ok(response)));
        self
    }

    /// Queue a failure for the next `operation` call.
    pub fn fail(&self, operation: Operation, message: impl Into<String>) -> &Self {
        self.lock()
            .responses
            .push_back((operation, Err(ScoutError::Transport(message.into()))));
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<(Operation, Value)> {
        self.lock().requests.clone()
    }

    /// Payloads received for one operation kind.
    pub fn requests_for(&self, operation: Operation) -> Vec<Value> {
        self.lock()
            .requests
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().requests.is_empty()
    }

    /// Forget recorded requests and queued responses.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.responses.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn call(&self, operation: Operation, payload: &Value) -> Result<Value> {
        let mut state = self.lock();
        state.requests.push((operation, payload.clone()));

        let queued = state
            .responses
            .iter()
            .position(|(op, _)| *op == operation)
            .and_then(|i| state.responses.remove(i));

        match queued {
            Some((_, response)) => response,
            None => Ok(operation.default_response()),
        }
    }
}

impl Transport for MemoryTransport {
    fn search(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::Search, payload)
    }

    fn count(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::Count, payload)
    }

    fn index(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::Index, payload)
    }

    fn delete(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::Delete, payload)
    }

    fn bulk(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::Bulk, payload)
    }

    fn put_mapping(&self, payload: &Value) -> Result<Value> {
        self.call(Operation::PutMapping, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport_is_empty() {
        let transport = MemoryTransport::new();
        assert!(transport.is_empty());
        assert_eq!(transport.len(), 0);
    }

    #[test]
    fn test_default_responses() {
        let transport = MemoryTransport::new();
        let response = transport.count(&json!({"index": "test"})).unwrap();
        assert_eq!(response, json!({"count": 0}));
        assert_eq!(transport.requests_for(Operation::Count), vec![json!({"index": "test"})]);
    }

    #[test]
    fn test_queued_responses_are_matched_by_operation() {
        let transport = MemoryTransport::new();
        transport
            .respond(Operation::Count, json!({"count": 7}))
            .respond(Operation::Search, json!({"hits": {"total": {"value": 1}}}));

        let search = transport.search(&json!({})).unwrap();
        assert_eq!(search["hits"]["total"]["value"], 1);

        let count = transport.count(&json!({})).unwrap();
        assert_eq!(count["count"], 7);

        // queue drained
        assert_eq!(transport.count(&json!({})).unwrap()["count"], 0);
        assert_eq!(transport.len(), 3);
    }

    #[test]
    fn test_queued_failure() {
        let transport = MemoryTransport::new();
        transport.fail(Operation::Index, "connection refused");

        let err = transport.index(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_clear() {
        let transport = MemoryTransport::new();
        transport.respond(Operation::Bulk, json!({"errors": true}));
        transport.search(&json!({})).unwrap();
        transport.clear();

        assert!(transport.is_empty());
        assert_eq!(transport.bulk(&json!({})).unwrap()["errors"], false);
    }
}
