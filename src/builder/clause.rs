// Clause buckets and the small vocabulary used to fill them.

use serde_json::{Map, Value};

/// Comparison operators accepted by `where_op`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `!=` or `<>`
    Ne,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
}

impl Operator {
    pub const SUPPORTED: [&'static str; 7] = ["=", ">", "<", "!=", ">=", "<=", "<>"];

    pub fn parse(operator: &str) -> Option<Self> {
        match operator.to_lowercase().as_str() {
            "=" => Some(Self::Eq),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            "!=" | "<>" => Some(Self::Ne),
            ">=" => Some(Self::Gte),
            "<=" => Some(Self::Lte),
            _ => None,
        }
    }

    /// Only equality and inequality may compare against null.
    pub fn accepts_null(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    /// Bound key of the range clause this operator compiles to
    pub fn range_bound(self) -> Option<&'static str> {
        match self {
            Self::Gt => Some("gt"),
            Self::Lt => Some("lt"),
            Self::Gte => Some("gte"),
            Self::Lte => Some("lte"),
            Self::Eq | Self::Ne => None,
        }
    }
}

/// Boolean group a clause is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Must,
    MustNot,
    Should,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::MustNot => "must_not",
            Self::Should => "should",
        }
    }
}

/// Accumulated where-clauses. `must` and `must_not` always exist; `should`
/// appears once an alternation clause has been added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clauses {
    must: Vec<Value>,
    must_not: Vec<Value>,
    should: Option<Vec<Value>>,
}

impl Clauses {
    pub fn push(&mut self, bucket: Bucket, clause: Value) {
        match bucket {
            Bucket::Must => self.must.push(clause),
            Bucket::MustNot => self.must_not.push(clause),
            Bucket::Should => self.should.get_or_insert_with(Vec::new).push(clause),
        }
    }

    /// File a negated clause. Under `should` the negation has to stay local
    /// to the alternative, so it is wrapped in its own bool/must_not.
    pub fn push_negative(&mut self, bucket: Bucket, clause: Value) {
        match bucket {
            Bucket::Should => {
                let mut negated = Map::new();
                negated.insert("must_not".to_string(), Value::Array(vec![clause]));
                let mut wrapper = Map::new();
                wrapper.insert("bool".to_string(), Value::Object(negated));
                self.push(Bucket::Should, Value::Object(wrapper));
            }
            Bucket::Must | Bucket::MustNot => self.must_not.push(clause),
        }
    }

    pub fn get(&self, bucket: Bucket) -> &[Value] {
        match bucket {
            Bucket::Must => &self.must,
            Bucket::MustNot => &self.must_not,
            Bucket::Should => self.should.as_deref().unwrap_or(&[]),
        }
    }

    /// Buckets in merge order: must, must_not, then should when present.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Value])> {
        [
            Some((Bucket::Must, self.must.as_slice())),
            Some((Bucket::MustNot, self.must_not.as_slice())),
            self.should.as_deref().map(|s| (Bucket::Should, s)),
        ]
        .into_iter()
        .flatten()
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (bucket, clauses) in self.iter() {
            map.insert(bucket.as_str().to_string(), Value::Array(clauses.to_vec()));
        }
        Value::Object(map)
    }

    pub(crate) fn retain_must<F>(&mut self, keep: F)
    where
        F: FnMut(&Value) -> bool,
    {
        self.must.retain(keep);
    }
}

pub const MATCH_PARAMETERS: &[&str] = &[
    "analyzer",
    "auto_generate_synonyms_phrase_query",
    "fuzziness",
    "max_expansions",
    "prefix_length",
    "fuzzy_transpositions",
    "fuzzy_rewrite",
    "lenient",
    "operator",
    "minimum_should_match",
    "zero_terms_query",
];

pub const MULTI_MATCH_PARAMETERS: &[&str] = &[
    "analyzer",
    "auto_generate_synonyms_phrase_query",
    "fuzziness",
    "max_expansions",
    "prefix_length",
    "fuzzy_transpositions",
    "fuzzy_rewrite",
    "lenient",
    "operator",
    "minimum_should_match",
    "zero_terms_query",
    "type",
];

pub const WILDCARD_PARAMETERS: &[&str] = &["boost", "case_insensitive", "rewrite"];

/// Keep only allow-listed parameters; everything else is dropped with a debug log.
pub(crate) fn validated_parameters(parameters: Value, allowed: &[&str]) -> Map<String, Value> {
    let parameters = match parameters {
        Value::Object(map) => map,
        Value::Null => return Map::new(),
        other => {
            tracing::debug!("Ignoring non-mapping Elasticsearch parameters: {}", other);
            return Map::new();
        }
    };

    let mut validated = Map::new();
    for (key, value) in parameters {
        if !allowed.contains(&key.as_str()) {
            tracing::debug!("Invalid Elasticsearch parameter: {}", key);
            continue;
        }
        validated.insert(key, value);
    }
    validated
}

/// `{key: value}`
pub(crate) fn keyed(key: impl Into<String>, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}
