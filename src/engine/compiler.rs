// Builder -> request payload compilation.

use crate::builder::FilterBuilder;
use crate::error::Result;
use crate::payload::{PayloadDocument, TypePayload};
use crate::rules::{QueryStringRule, SearchRule};
use serde_json::{json, Value};

/// Per-request switches applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Pull highlight sections from rule objects
    pub highlight: bool,
    pub explain: bool,
    pub profile: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            highlight: true,
            explain: false,
            profile: false,
        }
    }
}

impl CompileOptions {
    pub fn without_highlight() -> Self {
        Self {
            highlight: false,
            ..Self::default()
        }
    }

    pub fn explain() -> Self {
        Self {
            explain: true,
            ..Self::default()
        }
    }

    pub fn profile() -> Self {
        Self {
            profile: true,
            ..Self::default()
        }
    }
}

/// Turns a [`FilterBuilder`] into complete search request payloads.
pub struct QueryCompiler;

impl QueryCompiler {
    /// One payload for a filter-mode builder; one per applicable rule for a
    /// search-mode builder (possibly none).
    pub fn compile(builder: &FilterBuilder, options: &CompileOptions) -> Result<Vec<Value>> {
        let payloads = if builder.is_search() {
            Self::rule_payloads(builder, options)?
        } else {
            let mut payload = TypePayload::new(builder.model().as_ref())?;
            payload.set("body.query.bool.must.match_all", json!({}));
            vec![payload]
        };

        tracing::debug!(
            "Compiled {} payload(s) for {}",
            payloads.len(),
            builder.model().searchable_as()
        );

        Ok(payloads
            .into_iter()
            .map(|payload| Self::decorate(builder, options, payload))
            .collect())
    }

    fn rule_payloads(builder: &FilterBuilder, options: &CompileOptions) -> Result<Vec<TypePayload>> {
        let model = builder.model().as_ref();

        let mut rules = if builder.rules().is_empty() {
            model.search_rules()
        } else {
            builder.rules().to_vec()
        };
        if rules.is_empty() {
            rules.push(SearchRule::rule(QueryStringRule));
        }

        let mut payloads = Vec::with_capacity(rules.len());
        for rule in &rules {
            let mut payload = TypePayload::new(model)?;

            match rule {
                SearchRule::Callback(callback) => {
                    payload.set_if_not_empty("body.query.bool", callback(builder));
                }
                SearchRule::Rule(rule) => {
                    if !rule.is_applicable(builder) {
                        tracing::debug!("Skipping search rule that does not apply");
                        continue;
                    }

                    payload.set_if_not_empty("body.query.bool", rule.build_query_payload(builder));
                    if options.highlight {
                        payload.set_if_not_empty(
                            "body.highlight",
                            rule.build_highlight_payload(builder),
                        );
                    }
                }
            }

            payloads.push(payload);
        }

        Ok(payloads)
    }

    fn decorate(builder: &FilterBuilder, options: &CompileOptions, mut payload: TypePayload) -> Value {
        payload
            .set_if_not_empty("body._source", builder.selected_fields().to_vec())
            .set_if_not_empty("body.collapse.field", builder.collapse_field())
            .set_if_not_empty("body.sort", builder.orders().to_vec())
            .set_if_not_empty("body.explain", options.explain)
            .set_if_not_empty("body.profile", options.profile)
            .set_if_not_empty("body.aggs", builder.aggregates().clone())
            .set_if_not_empty("body.min_score", builder.min_score_threshold())
            .set_if_not_null("body.from", builder.offset())
            .set_if_not_null("body.size", builder.limit());

        if builder.tracks_total_hits() {
            payload.set("body.track_total_hits", true);
        }

        // Rule-provided filter clauses come first, builder clauses after
        for (bucket, filters) in builder.wheres().iter() {
            let key = format!("body.query.bool.filter.bool.{}", bucket.as_str());

            let mut merged = match payload.get(&key) {
                Some(Value::Array(existing)) => existing.clone(),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![other.clone()],
            };
            merged.extend(filters.iter().cloned());

            payload.set_if_not_empty(&key, merged);
        }

        if let Some(function_score) = builder.function_score() {
            let mut function_payload = function_score.build_payload();
            function_payload.set("query", payload.get_or("body.query", Value::Null));

            payload
                .unset("body.query")
                .set("body.query.function_score", function_payload.into_value());
        }

        payload.into_value()
    }
}
