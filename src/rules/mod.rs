//! Pluggable query and aggregation rules
//!
//! A search rule contributes the `body.query.bool` fragment (and optionally a
//! highlight) for one search attempt. Rules are either plain callbacks or
//! objects that can opt out through [`QueryRule::is_applicable`].

use crate::builder::FilterBuilder;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

pub type RuleCallback = Arc<dyn Fn(&FilterBuilder) -> Value + Send + Sync>;

pub type AggregateCallback = Arc<dyn Fn() -> Value + Send + Sync>;

/// Rule object contributing a bool-query fragment for a search-mode builder.
pub trait QueryRule: Send + Sync {
    fn is_applicable(&self, _builder: &FilterBuilder) -> bool {
        true
    }

    fn build_query_payload(&self, builder: &FilterBuilder) -> Value;

    /// Highlight section; null or empty means no highlighting.
    fn build_highlight_payload(&self, _builder: &FilterBuilder) -> Value {
        Value::Null
    }
}

/// A search rule: callback or rule object
#[derive(Clone)]
pub enum SearchRule {
    Callback(RuleCallback),
    Rule(Arc<dyn QueryRule>),
}

impl SearchRule {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&FilterBuilder) -> Value + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    pub fn rule<R>(rule: R) -> Self
    where
        R: QueryRule + 'static,
    {
        Self::Rule(Arc::new(rule))
    }
}

impl fmt::Debug for SearchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("SearchRule::Callback"),
            Self::Rule(_) => f.write_str("SearchRule::Rule"),
        }
    }
}

/// Default rule: the builder's free text as a `query_string` must clause.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringRule;

impl QueryRule for QueryStringRule {
    fn build_query_payload(&self, builder: &FilterBuilder) -> Value {
        json!({
            "must": {
                "query_string": {
                    "query": builder.query().unwrap_or_default(),
                }
            }
        })
    }
}

/// Rule object producing named aggregations.
pub trait AggregatePayload: Send + Sync {
    /// Aggregation name → aggregation spec, or `None` when there is nothing to add
    fn build_aggregate_payload(&self) -> Option<Map<String, Value>>;
}

/// An aggregation rule: callback or rule object
#[derive(Clone)]
pub enum AggregateRule {
    Callback(AggregateCallback),
    Rule(Arc<dyn AggregatePayload>),
}

impl AggregateRule {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    pub fn rule<R>(rule: R) -> Self
    where
        R: AggregatePayload + 'static,
    {
        Self::Rule(Arc::new(rule))
    }

    /// Aggregations this rule contributes. Callback results that are not a
    /// mapping contribute nothing.
    pub fn aggregations(&self) -> Option<Map<String, Value>> {
        match self {
            Self::Callback(f) => match f() {
                Value::Object(map) => Some(map),
                _ => None,
            },
            Self::Rule(rule) => rule.build_aggregate_payload(),
        }
    }
}

impl fmt::Debug for AggregateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("AggregateRule::Callback"),
            Self::Rule(_) => f.write_str("AggregateRule::Rule"),
        }
    }
}
