use crate::model::ScoredRecord;
use serde::Serialize;
use serde_json::Value;

/// Raw search response together with the payload that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Compiled payload of the attempt that was kept (none for raw callbacks)
    pub payload: Option<Value>,

    pub response: Value,
}

impl SearchResults {
    pub fn new(payload: Option<Value>, response: Value) -> Self {
        Self { payload, response }
    }

    pub fn total_count(&self) -> u64 {
        total_count(&self.response)
    }

    pub fn hits(&self) -> &[Value] {
        self.response
            .get("hits")
            .and_then(|hits| hits.get("hits"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn aggregations(&self) -> Option<&Value> {
        self.response.get("aggregations")
    }

    /// `body._source` of the payload, when fields were selected.
    pub fn selected_columns(&self) -> Option<Vec<String>> {
        let source = self.payload.as_ref()?.get("body")?.get("_source")?;
        Some(
            source
                .as_array()?
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect(),
        )
    }
}

/// `hits.total.value`, or a bare numeric `hits.total`; 0 otherwise.
pub fn total_count(response: &Value) -> u64 {
    match response.get("hits").and_then(|hits| hits.get("total")) {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(Value::Number(total)) => total.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// One page of mapped records.
#[derive(Debug, Clone)]
pub struct Page<R> {
    pub items: Vec<ScoredRecord<R>>,
    pub total: u64,
    pub per_page: usize,
    pub current_page: usize,
}

impl<R> Page<R> {
    pub fn new(items: Vec<ScoredRecord<R>>, total: u64, per_page: usize, current_page: usize) -> Self {
        Self {
            items,
            total,
            per_page,
            current_page,
        }
    }

    pub fn last_page(&self) -> usize {
        if self.per_page == 0 {
            return 1;
        }
        let pages = match usize::try_from(self.total) {
            Ok(total) => total.div_ceil(self.per_page),
            Err(_) => usize::MAX,
        };
        pages.max(1)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }
}
