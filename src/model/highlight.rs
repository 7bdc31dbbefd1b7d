use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Highlighted fragments of a hit, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Highlight {
    fields: Map<String, Value>,
}

impl Highlight {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build from a hit's `highlight` value; anything but a mapping is ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|fields| Self::new(fields.clone()))
    }

    /// Raw fragments for `field`
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Fragments for `field` joined with a single space
    pub fn as_string(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Array(fragments) => Some(
                fragments
                    .iter()
                    .map(|f| match f {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}
