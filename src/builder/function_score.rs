// function_score parameters for a compiled query.

use crate::payload::{PayloadDocument, RawPayload};
use serde_json::{Map, Value};

/// Optional function_score settings. Only fields that were set are emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionScoreBuilder {
    score_mode: Option<String>,
    boost_mode: Option<String>,
    functions: Vec<Value>,
    script_score: Map<String, Value>,
    random_score: Map<String, Value>,
    field_value_factor: Map<String, Value>,
    max_boost: Option<f64>,
    min_score: Option<f64>,
    weight: Option<f64>,
}

impl FunctionScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile to a payload in fixed key order: score_mode, boost_mode,
    /// functions, script_score, random_score, field_value_factor, max_boost,
    /// min_score, weight.
    pub fn build_payload(&self) -> RawPayload {
        let mut payload = RawPayload::new();
        payload
            .set_if_not_null("score_mode", self.score_mode.clone())
            .set_if_not_null("boost_mode", self.boost_mode.clone())
            .set_if_not_empty("functions", self.functions.clone())
            .set_if_not_empty("script_score", self.script_score.clone())
            .set_if_not_empty("random_score", self.random_score.clone())
            .set_if_not_empty("field_value_factor", self.field_value_factor.clone())
            .set_if_not_null("max_boost", self.max_boost)
            .set_if_not_null("min_score", self.min_score)
            .set_if_not_null("weight", self.weight);
        payload
    }

    pub fn score_mode(mut self, mode: impl Into<String>) -> Self {
        self.score_mode = Some(mode.into());
        self
    }

    pub fn boost_mode(mut self, mode: impl Into<String>) -> Self {
        self.boost_mode = Some(mode.into());
        self
    }

    pub fn functions(mut self, functions: Vec<Value>) -> Self {
        self.functions = functions;
        self
    }

    pub fn script_score(mut self, script_score: Map<String, Value>) -> Self {
        self.script_score = script_score;
        self
    }

    pub fn random_score(mut self, random_score: Map<String, Value>) -> Self {
        self.random_score = random_score;
        self
    }

    pub fn field_value_factor(mut self, factor: Map<String, Value>) -> Self {
        self.field_value_factor = factor;
        self
    }

    pub fn max_boost(mut self, max_boost: Option<f64>) -> Self {
        self.max_boost = max_boost;
        self
    }

    pub fn min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn weight(mut self, weight: Option<f64>) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_builder_emits_nothing() {
        let payload = FunctionScoreBuilder::new().build_payload();
        assert_eq!(payload.to_value(), json!({}));
    }

    #[test]
    fn test_only_set_fields_in_fixed_order() {
        let mut random = Map::new();
        random.insert("seed".into(), json!(10));

        let payload = FunctionScoreBuilder::new()
            .weight(Some(2.0))
            .random_score(random)
            .boost_mode("multiply")
            .score_mode("sum")
            .min_score(Some(0.0))
            .build_payload();

        let compiled = payload.to_value();
        assert_eq!(
            compiled,
            json!({
                "score_mode": "sum",
                "boost_mode": "multiply",
                "random_score": {"seed": 10},
                "min_score": 0.0,
                "weight": 2.0,
            })
        );

        let keys: Vec<&String> = compiled.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["score_mode", "boost_mode", "random_score", "min_score", "weight"]
        );
    }
}
