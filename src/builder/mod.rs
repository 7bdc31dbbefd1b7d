//! Fluent filter/search builder
//!
//! A [`FilterBuilder`] accumulates where-clauses into `must`, `must_not` and
//! `should` buckets, together with sorting, paging, aggregations and scoring
//! settings. It is compiled into request payloads by
//! [`QueryCompiler`](crate::engine::QueryCompiler) and executed through an
//! [`ElasticEngine`].
//!
//! Builders are either in filter mode (no free text, one `match_all` payload)
//! or in search mode (free text, one payload per applicable rule). The mode is
//! fixed at construction.
//!
//! ```
//! # use std::sync::Arc;
//! # use scout_elastic::model::{IndexConfigurator, SearchableModel};
//! # use scout_elastic::builder::FilterBuilder;
//! # use serde_json::json;
//! # struct Index;
//! # impl IndexConfigurator for Index { fn name(&self) -> String { "books".into() } }
//! # struct Book;
//! # impl SearchableModel for Book {
//! #     fn searchable_as(&self) -> String { "book".into() }
//! #     fn index_configurator(&self) -> Option<Arc<dyn IndexConfigurator>> { Some(Arc::new(Index)) }
//! # }
//! let builder = FilterBuilder::new(Arc::new(Book), false)
//!     .where_eq("author", "tolkien")
//!     .where_op("pages", ">", 300)?
//!     .order_by("published", "desc")
//!     .take(10);
//!
//! assert_eq!(
//!     builder.to_query()?["query"]["bool"]["filter"]["bool"]["must"],
//!     json!([{"term": {"author": "tolkien"}}, {"range": {"pages": {"gt": 300}}}])
//! );
//! # Ok::<(), scout_elastic::ScoutError>(())
//! ```

mod clause;
mod function_score;

pub use clause::{
    Bucket, Clauses, Operator, MATCH_PARAMETERS, MULTI_MATCH_PARAMETERS, WILDCARD_PARAMETERS,
};
pub use function_score::FunctionScoreBuilder;

use crate::engine::{CompileOptions, ElasticEngine, Page, QueryCompiler, SearchResults};
use crate::error::{Result, ScoutError};
use crate::model::{RecordProvider, ScoredRecord, SearchableModel, SOFT_DELETED_FIELD};
use crate::rules::{AggregateRule, SearchRule};
use crate::transport::Transport;
use clause::{keyed, validated_parameters};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// Replaces the whole search round-trip: receives the transport, the free
/// text and the compile options, returns the raw response.
pub type RawSearchCallback =
    Arc<dyn Fn(&dyn Transport, Option<&str>, &CompileOptions) -> Result<Value> + Send + Sync>;

/// Fluent query builder for one record type.
#[derive(Clone)]
pub struct FilterBuilder {
    model: Arc<dyn SearchableModel>,
    query: Option<String>,
    callback: Option<RawSearchCallback>,
    wheres: Clauses,
    orders: Vec<Value>,
    offset: Option<usize>,
    limit: Option<usize>,
    select: Vec<String>,
    collapse: Option<String>,
    min_score: Option<f64>,
    aggregates: Map<String, Value>,
    with: Vec<String>,
    with_scores: bool,
    with_total_hits: bool,
    function_score: Option<FunctionScoreBuilder>,
    rules: Vec<SearchRule>,
}

impl FilterBuilder {
    /// Filter-mode builder. With `soft_delete` the soft-deleted marker is
    /// excluded from the start.
    pub fn new(model: Arc<dyn SearchableModel>, soft_delete: bool) -> Self {
        let mut wheres = Clauses::default();
        if soft_delete {
            wheres.push(Bucket::Must, soft_deleted_term(0));
        }

        Self {
            model,
            query: None,
            callback: None,
            wheres,
            orders: Vec::new(),
            offset: None,
            limit: None,
            select: Vec::new(),
            collapse: None,
            min_score: None,
            aggregates: Map::new(),
            with: Vec::new(),
            with_scores: false,
            with_total_hits: false,
            function_score: None,
            rules: Vec::new(),
        }
    }

    /// Search-mode builder matching `query` through the search rules.
    pub fn new_search(
        model: Arc<dyn SearchableModel>,
        query: impl Into<String>,
        soft_delete: bool,
    ) -> Self {
        let mut builder = Self::new(model, soft_delete);
        builder.query = Some(query.into());
        builder
    }

    /// `"*"` gives a filter-mode builder, anything else a search-mode one.
    pub fn for_query(model: Arc<dyn SearchableModel>, query: &str, soft_delete: bool) -> Self {
        if query == "*" {
            Self::new(model, soft_delete)
        } else {
            Self::new_search(model, query, soft_delete)
        }
    }

    // ---- where ----

    /// Equality clause, same as `where_op(field, "=", value)`.
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_where(Bucket::Must, field.into(), Operator::Eq, value.into())
    }

    /// Comparison clause. An operator outside [`Operator::SUPPORTED`] is
    /// taken as the value of an equality clause.
    pub fn where_op(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.where_in_bucket(field, operator, value, Bucket::Must)
    }

    pub fn or_where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_where(Bucket::Should, field.into(), Operator::Eq, value.into())
    }

    pub fn or_where_op(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.where_in_bucket(field, operator, value, Bucket::Should)
    }

    /// Comparison clause filed under an explicit bucket.
    pub fn where_in_bucket(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
        bucket: Bucket,
    ) -> Result<Self> {
        let value = value.into();
        let (operator, value) = match Operator::parse(operator) {
            Some(op) if value.is_null() && !op.accepts_null() => {
                return Err(ScoutError::InvalidArgument(
                    "Illegal operator and value combination.".to_string(),
                ));
            }
            Some(op) => (op, value),
            None => (Operator::Eq, Value::String(operator.to_string())),
        };

        Ok(self.push_where(bucket, field.into(), operator, value))
    }

    fn push_where(mut self, bucket: Bucket, field: String, operator: Operator, value: Value) -> Self {
        match operator.range_bound() {
            Some(bound) => {
                let clause = keyed("range", keyed(field, keyed(bound, value)));
                self.wheres.push(bucket, clause);
            }
            None if operator == Operator::Ne => {
                self.wheres.push_negative(bucket, keyed("term", keyed(field, value)));
            }
            None => self.wheres.push(bucket, keyed("term", keyed(field, value))),
        }
        self
    }

    pub fn where_between(
        self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push_between(Bucket::Must, field.into(), lower.into(), upper.into())
    }

    pub fn or_where_between(
        self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push_between(Bucket::Should, field.into(), lower.into(), upper.into())
    }

    fn push_between(mut self, bucket: Bucket, field: String, lower: Value, upper: Value) -> Self {
        self.wheres.push(bucket, between_clause(field, lower, upper));
        self
    }

    pub fn where_not_between(
        self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push_not_between(Bucket::Must, field.into(), lower.into(), upper.into())
    }

    pub fn or_where_not_between(
        self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push_not_between(Bucket::Should, field.into(), lower.into(), upper.into())
    }

    fn push_not_between(
        mut self,
        bucket: Bucket,
        field: String,
        lower: Value,
        upper: Value,
    ) -> Self {
        self.wheres
            .push_negative(bucket, between_clause(field, lower, upper));
        self
    }

    pub fn where_in<I>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_in(Bucket::Must, field.into(), collect_values(values), false)
    }

    pub fn or_where_in<I>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_in(Bucket::Should, field.into(), collect_values(values), false)
    }

    pub fn where_not_in<I>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_in(Bucket::Must, field.into(), collect_values(values), true)
    }

    pub fn or_where_not_in<I>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_in(Bucket::Should, field.into(), collect_values(values), true)
    }

    fn push_in(mut self, bucket: Bucket, field: String, values: Vec<Value>, negate: bool) -> Self {
        let clause = keyed("terms", keyed(field, Value::Array(values)));
        if negate {
            self.wheres.push_negative(bucket, clause);
        } else {
            self.wheres.push(bucket, clause);
        }
        self
    }

    pub fn where_exists(self, field: impl Into<String>) -> Self {
        self.push_exists(Bucket::Must, field.into(), false)
    }

    pub fn or_where_exists(self, field: impl Into<String>) -> Self {
        self.push_exists(Bucket::Should, field.into(), false)
    }

    pub fn where_not_exists(self, field: impl Into<String>) -> Self {
        self.push_exists(Bucket::Must, field.into(), true)
    }

    pub fn or_where_not_exists(self, field: impl Into<String>) -> Self {
        self.push_exists(Bucket::Should, field.into(), true)
    }

    fn push_exists(mut self, bucket: Bucket, field: String, negate: bool) -> Self {
        let clause = json!({"exists": {"field": field}});
        if negate {
            self.wheres.push_negative(bucket, clause);
        } else {
            self.wheres.push(bucket, clause);
        }
        self
    }

    // ---- full text ----

    /// `match` clause. Only [`MATCH_PARAMETERS`] are kept from `parameters`.
    pub fn where_match(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        parameters: Value,
    ) -> Self {
        self.push_match(Bucket::Must, field.into(), value.into(), parameters)
    }

    pub fn or_where_match(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        parameters: Value,
    ) -> Self {
        self.push_match(Bucket::Should, field.into(), value.into(), parameters)
    }

    fn push_match(mut self, bucket: Bucket, field: String, value: String, parameters: Value) -> Self {
        let mut body = validated_parameters(parameters, MATCH_PARAMETERS);
        body.insert("query".to_string(), Value::String(value));
        self.wheres
            .push(bucket, keyed("match", keyed(field, Value::Object(body))));
        self
    }

    pub fn where_not_match(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_not_match(Bucket::Must, field.into(), value.into())
    }

    pub fn or_where_not_match(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_not_match(Bucket::Should, field.into(), value.into())
    }

    fn push_not_match(mut self, bucket: Bucket, field: String, value: String) -> Self {
        let clause = keyed("match", keyed(field, Value::String(value)));
        self.wheres.push_negative(bucket, clause);
        self
    }

    /// `multi_match` clause over `fields`. Every field must be a string.
    pub fn where_multi_match<I>(
        self,
        fields: I,
        value: impl Into<String>,
        parameters: Value,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_multi_match(Bucket::Must, collect_values(fields), value.into(), parameters)
    }

    pub fn or_where_multi_match<I>(
        self,
        fields: I,
        value: impl Into<String>,
        parameters: Value,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_multi_match(Bucket::Should, collect_values(fields), value.into(), parameters)
    }

    fn push_multi_match(
        mut self,
        bucket: Bucket,
        fields: Vec<Value>,
        value: String,
        parameters: Value,
    ) -> Result<Self> {
        if let Some(field) = fields.iter().find(|f| !f.is_string()) {
            return Err(ScoutError::InvalidArgument(format!(
                "Invalid field in multi match: {}",
                field
            )));
        }

        let mut body = validated_parameters(parameters, MULTI_MATCH_PARAMETERS);
        body.insert("fields".to_string(), Value::Array(fields));
        body.insert("query".to_string(), Value::String(value));
        self.wheres
            .push(bucket, keyed("multi_match", Value::Object(body)));
        Ok(self)
    }

    /// `wildcard` clause. Only [`WILDCARD_PARAMETERS`] are kept from `parameters`.
    pub fn where_wildcard(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        parameters: Value,
    ) -> Self {
        self.push_wildcard(Bucket::Must, field.into(), value.into(), parameters)
    }

    pub fn or_where_wildcard(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        parameters: Value,
    ) -> Self {
        self.push_wildcard(Bucket::Should, field.into(), value.into(), parameters)
    }

    fn push_wildcard(
        mut self,
        bucket: Bucket,
        field: String,
        value: String,
        parameters: Value,
    ) -> Self {
        let mut body = validated_parameters(parameters, WILDCARD_PARAMETERS);
        body.insert("value".to_string(), Value::String(value));
        self.wheres
            .push(bucket, keyed("wildcard", keyed(field, Value::Object(body))));
        self
    }

    /// `regexp` clause with the `ALL` flags.
    pub fn where_regexp(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.where_regexp_with_flags(field, value, "ALL")
    }

    pub fn where_regexp_with_flags(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        flags: &str,
    ) -> Self {
        self.push_regexp(Bucket::Must, field.into(), value.into(), flags)
    }

    pub fn or_where_regexp(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_regexp(Bucket::Should, field.into(), value.into(), "ALL")
    }

    pub fn or_where_regexp_with_flags(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        flags: &str,
    ) -> Self {
        self.push_regexp(Bucket::Should, field.into(), value.into(), flags)
    }

    fn push_regexp(mut self, bucket: Bucket, field: String, value: String, flags: &str) -> Self {
        let clause = keyed(
            "regexp",
            keyed(field, json!({"value": value, "flags": flags})),
        );
        self.wheres.push(bucket, clause);
        self
    }

    // ---- geo ----

    pub fn where_geo_bounding_box(self, field: impl Into<String>, value: Value) -> Self {
        self.push_geo_bounding_box(Bucket::Must, field.into(), value)
    }

    pub fn or_where_geo_bounding_box(self, field: impl Into<String>, value: Value) -> Self {
        self.push_geo_bounding_box(Bucket::Should, field.into(), value)
    }

    fn push_geo_bounding_box(mut self, bucket: Bucket, field: String, value: Value) -> Self {
        self.wheres
            .push(bucket, keyed("geo_bounding_box", keyed(field, value)));
        self
    }

    pub fn where_geo_distance(
        self,
        field: impl Into<String>,
        value: Value,
        distance: impl Into<Value>,
    ) -> Self {
        self.push_geo_distance(Bucket::Must, field.into(), value, distance.into())
    }

    pub fn or_where_geo_distance(
        self,
        field: impl Into<String>,
        value: Value,
        distance: impl Into<Value>,
    ) -> Self {
        self.push_geo_distance(Bucket::Should, field.into(), value, distance.into())
    }

    fn push_geo_distance(
        mut self,
        bucket: Bucket,
        field: String,
        value: Value,
        distance: Value,
    ) -> Self {
        let mut body = Map::new();
        body.insert("distance".to_string(), distance);
        body.insert(field, value);
        self.wheres
            .push(bucket, keyed("geo_distance", Value::Object(body)));
        self
    }

    pub fn where_geo_polygon(self, field: impl Into<String>, points: Vec<Value>) -> Self {
        self.push_geo_polygon(Bucket::Must, field.into(), points)
    }

    pub fn or_where_geo_polygon(self, field: impl Into<String>, points: Vec<Value>) -> Self {
        self.push_geo_polygon(Bucket::Should, field.into(), points)
    }

    fn push_geo_polygon(mut self, bucket: Bucket, field: String, points: Vec<Value>) -> Self {
        let clause = keyed("geo_polygon", keyed(field, json!({"points": points})));
        self.wheres.push(bucket, clause);
        self
    }

    /// `geo_shape` clause with the `INTERSECTS` relation.
    pub fn where_geo_shape(self, field: impl Into<String>, shape: Value) -> Self {
        self.where_geo_shape_with_relation(field, shape, "INTERSECTS")
    }

    pub fn where_geo_shape_with_relation(
        self,
        field: impl Into<String>,
        shape: Value,
        relation: &str,
    ) -> Self {
        self.push_geo_shape(Bucket::Must, field.into(), shape, relation)
    }

    pub fn or_where_geo_shape(self, field: impl Into<String>, shape: Value) -> Self {
        self.push_geo_shape(Bucket::Should, field.into(), shape, "INTERSECTS")
    }

    fn push_geo_shape(mut self, bucket: Bucket, field: String, shape: Value, relation: &str) -> Self {
        let clause = keyed(
            "geo_shape",
            keyed(field, json!({"shape": shape, "relation": relation})),
        );
        self.wheres.push(bucket, clause);
        self
    }

    // ---- nested ----

    /// Compile a sub-builder and splice its filter tree into `must`.
    pub fn where_nested<F>(self, callback: F) -> Result<Self>
    where
        F: FnOnce(FilterBuilder) -> Result<FilterBuilder>,
    {
        self.push_nested(Bucket::Must, None, callback)
    }

    pub fn or_where_nested<F>(self, callback: F) -> Result<Self>
    where
        F: FnOnce(FilterBuilder) -> Result<FilterBuilder>,
    {
        self.push_nested(Bucket::Should, None, callback)
    }

    /// Compile a sub-builder and wrap its filter tree in a `nested` query on `path`.
    pub fn where_has<F>(self, path: impl Into<String>, callback: F) -> Result<Self>
    where
        F: FnOnce(FilterBuilder) -> Result<FilterBuilder>,
    {
        self.push_nested(Bucket::Must, Some(path.into()), callback)
    }

    pub fn or_where_has<F>(self, path: impl Into<String>, callback: F) -> Result<Self>
    where
        F: FnOnce(FilterBuilder) -> Result<FilterBuilder>,
    {
        self.push_nested(Bucket::Should, Some(path.into()), callback)
    }

    fn push_nested<F>(mut self, bucket: Bucket, path: Option<String>, callback: F) -> Result<Self>
    where
        F: FnOnce(FilterBuilder) -> Result<FilterBuilder>,
    {
        let nested = callback(FilterBuilder::new(self.model.clone(), false))?;
        let filter = nested.compiled_filter()?;

        let clause = match path {
            Some(path) => json!({"nested": {"path": path, "query": filter}}),
            None => filter,
        };
        self.wheres.push(bucket, clause);
        Ok(self)
    }

    /// `bool.filter` of the first compiled payload, read through a
    /// function_score wrapper when there is one.
    fn compiled_filter(&self) -> Result<Value> {
        let payloads = QueryCompiler::compile(self, &CompileOptions::default())?;
        Ok(payloads
            .first()
            .and_then(|p| {
                p.pointer("/body/query/bool/filter")
                    .or_else(|| p.pointer("/body/query/function_score/query/bool/filter"))
            })
            .cloned()
            .unwrap_or_else(|| json!({"bool": {}})))
    }

    // ---- soft delete ----

    /// Only soft-deleted records.
    pub fn only_trashed(self) -> Self {
        let mut builder = self.with_trashed();
        builder.wheres.push(Bucket::Must, soft_deleted_term(1));
        builder
    }

    /// Drop the soft-deleted exclusion, keeping every other clause.
    pub fn with_trashed(mut self) -> Self {
        let excluded = json!(0);
        let pointer = format!("/term/{}", SOFT_DELETED_FIELD);
        self.wheres
            .retain_must(|clause| clause.pointer(&pointer) != Some(&excluded));
        self
    }

    // ---- aggregations, sorting, paging ----

    /// Merge the rule's aggregations; later names overwrite earlier ones.
    pub fn add_aggregate(mut self, rule: AggregateRule) -> Self {
        if let Some(aggregations) = rule.aggregations() {
            for (name, spec) in aggregations {
                self.aggregates.insert(name, spec);
            }
        }
        self
    }

    /// Sort by `field`; `asc` (any case) ascends, anything else descends.
    pub fn order_by(mut self, field: impl Into<String>, direction: &str) -> Self {
        let direction = if direction.eq_ignore_ascii_case("asc") {
            "asc"
        } else {
            "desc"
        };
        self.orders.push(keyed(field, Value::String(direction.to_string())));
        self
    }

    /// Raw sort entry, appended as given.
    pub fn order_raw(mut self, payload: Value) -> Self {
        self.orders.push(payload);
        self
    }

    /// Add fields to `_source`.
    pub fn select<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn collapse(mut self, field: impl Into<String>) -> Self {
        self.collapse = Some(field.into());
        self
    }

    pub fn from(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn min_score(mut self, score: f64) -> Self {
        self.min_score = Some(score);
        self
    }

    // ---- flags ----

    /// Relations to eager load when mapping hits back to records.
    pub fn with<I>(mut self, relations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.with = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scores(mut self, with_scores: bool) -> Self {
        self.with_scores = with_scores;
        self
    }

    pub fn with_total_hits(mut self, with_total_hits: bool) -> Self {
        self.with_total_hits = with_total_hits;
        self
    }

    pub fn with_function_score<F>(mut self, build: F) -> Self
    where
        F: FnOnce(FunctionScoreBuilder) -> FunctionScoreBuilder,
    {
        self.function_score = Some(build(FunctionScoreBuilder::new()));
        self
    }

    pub fn with_script_score<F>(self, build: F) -> Self
    where
        F: FnOnce(FunctionScoreBuilder) -> FunctionScoreBuilder,
    {
        self.with_function_score(build)
    }

    /// Add a search rule. Builders with rules ignore the record type's defaults.
    pub fn rule(mut self, rule: SearchRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replace the search round-trip with `callback`.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Transport, Option<&str>, &CompileOptions) -> Result<Value>
            + Send
            + Sync
            + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Apply `f` only when `condition` holds.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            f(self)
        } else {
            self
        }
    }

    pub fn when_else<F, G>(self, condition: bool, f: F, otherwise: G) -> Self
    where
        F: FnOnce(Self) -> Self,
        G: FnOnce(Self) -> Self,
    {
        if condition {
            f(self)
        } else {
            otherwise(self)
        }
    }

    // ---- accessors ----

    pub fn model(&self) -> &Arc<dyn SearchableModel> {
        &self.model
    }

    /// Free text of a search-mode builder
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_search(&self) -> bool {
        self.query.is_some()
    }

    pub fn callback(&self) -> Option<&RawSearchCallback> {
        self.callback.as_ref()
    }

    pub fn wheres(&self) -> &Clauses {
        &self.wheres
    }

    pub fn orders(&self) -> &[Value] {
        &self.orders
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.select
    }

    pub fn collapse_field(&self) -> Option<&str> {
        self.collapse.as_deref()
    }

    pub fn min_score_threshold(&self) -> Option<f64> {
        self.min_score
    }

    pub fn aggregates(&self) -> &Map<String, Value> {
        &self.aggregates
    }

    pub fn relations(&self) -> &[String] {
        &self.with
    }

    pub fn wants_scores(&self) -> bool {
        self.with_scores
    }

    pub fn tracks_total_hits(&self) -> bool {
        self.with_total_hits
    }

    pub fn function_score(&self) -> Option<&FunctionScoreBuilder> {
        self.function_score.as_ref()
    }

    pub fn rules(&self) -> &[SearchRule] {
        &self.rules
    }

    // ---- compilation ----

    /// Compiled request payloads, one per applicable rule.
    pub fn build_payload(&self) -> Result<Vec<Value>> {
        QueryCompiler::compile(self, &CompileOptions::default())
    }

    /// Request body of the single compiled payload, or an array of all bodies
    /// when several rules applied.
    pub fn to_query(&self) -> Result<Value> {
        let mut bodies: Vec<Value> = self
            .build_payload()?
            .into_iter()
            .map(|mut payload| payload.get_mut("body").map(Value::take).unwrap_or_default())
            .collect();

        match bodies.len() {
            0 => Err(ScoutError::NoQueryFound),
            1 => Ok(bodies.remove(0)),
            _ => Ok(Value::Array(bodies)),
        }
    }

    pub fn to_query_json(&self) -> Result<String> {
        let query = self.to_query()?;
        serde_json::to_string(&query).map_err(|e| ScoutError::Json {
            source: e,
            context: "serializing compiled query".to_string(),
        })
    }

    // ---- execution ----

    /// Matching records in hit order.
    pub fn get<P>(&self, engine: &ElasticEngine, provider: &P) -> Result<Vec<ScoredRecord<P::Record>>>
    where
        P: RecordProvider,
    {
        let results = engine.search(self)?;
        engine.map(self, &results, provider)
    }

    /// `_source` of every hit, with the hit's `_score` under `score`.
    pub fn get_raw(&self, engine: &ElasticEngine) -> Result<Vec<Map<String, Value>>> {
        let results = engine.search(self)?;
        if results.total_count() == 0 {
            return Ok(Vec::new());
        }

        Ok(results
            .hits()
            .iter()
            .map(|hit| {
                let mut row = hit
                    .get("_source")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                row.insert(
                    "score".to_string(),
                    hit.get("_score").cloned().unwrap_or(Value::Null),
                );
                row
            })
            .collect())
    }

    /// [`get_raw`](Self::get_raw) rows deserialized into `T`.
    pub fn hydrate<T>(&self, engine: &ElasticEngine) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.get_raw(engine)?
            .into_iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row)).map_err(|e| ScoutError::Json {
                    source: e,
                    context: "hydrating search hit".to_string(),
                })
            })
            .collect()
    }

    /// One page of records. Pages are 1-based.
    pub fn paginate<P>(
        &self,
        engine: &ElasticEngine,
        provider: &P,
        per_page: usize,
        page: usize,
    ) -> Result<Page<P::Record>>
    where
        P: RecordProvider,
    {
        let page = page.max(1);
        let results = engine.paginate(self, per_page, page)?;
        let items = engine.map(self, &results, provider)?;
        Ok(Page::new(items, results.total_count(), per_page, page))
    }

    pub fn count(&self, engine: &ElasticEngine) -> Result<u64> {
        engine.count(self)
    }

    pub fn explain(&self, engine: &ElasticEngine) -> Result<SearchResults> {
        engine.explain(self)
    }

    pub fn profile(&self, engine: &ElasticEngine) -> Result<SearchResults> {
        engine.profile(self)
    }

    /// Search returning only aggregation results (plus `size` hits).
    pub fn aggregate(&self, engine: &ElasticEngine, size: usize) -> Result<SearchResults> {
        let builder = self.clone().take(size);
        engine.search(&builder)
    }

    /// Sum of `field` over the matching documents.
    pub fn sum(&self, engine: &ElasticEngine, field: &str) -> Result<f64> {
        let mut builder = self.clone();
        builder.aggregates = Map::new();
        builder
            .aggregates
            .insert(field.to_string(), json!({"sum": {"field": field}}));

        let results = builder.aggregate(engine, 0)?;
        results
            .response
            .get("aggregations")
            .and_then(|aggs| aggs.get(field))
            .and_then(|agg| agg.get("value"))
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ScoutError::UnexpectedResponse(format!("missing sum aggregation for {}", field))
            })
    }
}

impl fmt::Debug for FilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBuilder")
            .field("model", &self.model.searchable_as())
            .field("query", &self.query)
            .field("callback", &self.callback.is_some())
            .field("wheres", &self.wheres)
            .field("orders", &self.orders)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("select", &self.select)
            .field("collapse", &self.collapse)
            .field("min_score", &self.min_score)
            .field("aggregates", &self.aggregates)
            .field("with", &self.with)
            .field("with_scores", &self.with_scores)
            .field("with_total_hits", &self.with_total_hits)
            .field("function_score", &self.function_score)
            .field("rules", &self.rules)
            .finish()
    }
}

fn soft_deleted_term(value: u8) -> Value {
    keyed("term", keyed(SOFT_DELETED_FIELD, json!(value)))
}

fn between_clause(field: String, lower: Value, upper: Value) -> Value {
    keyed("range", keyed(field, json!({"gte": lower, "lte": upper})))
}

fn collect_values<I>(values: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    values.into_iter().map(Into::into).collect()
}
