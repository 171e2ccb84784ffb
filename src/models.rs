use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Opaque payload of a [`Fact`]: a number, a string, or nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bit-level comparison keeps Eq and Hash consistent for floats.
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            Value::Float(v) => {
                state.write_u8(2);
                v.to_bits().hash(state);
            }
            Value::Text(v) => {
                state.write_u8(3);
                v.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// An atomic observation produced by one of the analysis parsers.
///
/// `value_type` is a colon-separated category path such as `sentiment:mean`;
/// the segment before the first `:` is the topical category used for
/// satellite grouping. `outlierness` is the interest score assigned by the
/// producing analysis.
///
/// Equality and hashing cover `(value, value_type)` only: two facts
/// describing the same observation are duplicates no matter how interesting
/// each producer thought they were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub value: Value,
    pub value_type: String,
    pub outlierness: f64,
}

impl Fact {
    pub fn new(value: impl Into<Value>, value_type: impl Into<String>, outlierness: f64) -> Self {
        Self {
            value: value.into(),
            value_type: value_type.into(),
            outlierness,
        }
    }

    /// Leading segment of the value type path, i.e. the topical category.
    #[must_use]
    pub fn category(&self) -> &str {
        self.value_type
            .split(':')
            .next()
            .unwrap_or(&self.value_type)
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.value_type == other.value_type
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.value_type.hash(state);
    }
}

/// A fact plus the selection score the planner operates on.
///
/// The score starts at the fact's outlierness downstream of the importance
/// allocator; only `score` is ever mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub main_fact: Fact,
    pub score: f64,
}

impl Message {
    #[must_use]
    pub fn new(main_fact: Fact) -> Self {
        Self {
            main_fact,
            score: 0.0,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}: {}>",
            self.main_fact.value_type, self.main_fact.value
        )
    }
}

/// One nucleus message with its elaborating satellites, satellites ordered
/// by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub nucleus: Message,
    pub satellites: Vec<Message>,
}

impl Paragraph {
    #[must_use]
    pub fn new(nucleus: Message, satellites: Vec<Message>) -> Self {
        Self {
            nucleus,
            satellites,
        }
    }
}

/// The planned, ordered structure handed to the downstream realizer.
///
/// A body document carries up to [`MAX_PARAGRAPHS`](crate::pipeline::plan::MAX_PARAGRAPHS)
/// paragraphs; a headline document carries exactly one satellite-free
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    #[must_use]
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn facts_with_equal_value_and_type_are_duplicates() {
        let a = Fact::new(3.5, "sentiment:mean", 7.10);
        let b = Fact::new(3.5, "sentiment:mean", 0.1);
        assert_eq!(a, b);

        let mut seen = HashSet::new();
        assert!(seen.insert(a));
        assert!(!seen.insert(b));
    }

    #[test]
    fn facts_differ_by_value_or_type() {
        let base = Fact::new(120i64, "stats:count", 10.10);
        assert_ne!(base, Fact::new(121i64, "stats:count", 10.10));
        assert_ne!(base, Fact::new(120i64, "stats:other", 10.10));
    }

    #[test]
    fn int_and_float_payloads_are_distinct() {
        let int_fact = Fact::new(1i64, "stats:count", 1.0);
        let float_fact = Fact::new(1.0, "stats:count", 1.0);
        assert_ne!(int_fact, float_fact);
    }

    #[test]
    fn category_is_the_leading_path_segment() {
        assert_eq!(
            Fact::new(Value::Null, "hate_speech:blocked:abs", 9.10).category(),
            "hate_speech"
        );
        assert_eq!(Fact::new(Value::Null, "summary", 8.10).category(), "summary");
    }

    #[test]
    fn value_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&Value::Text("hi".into())).expect("serialize"),
            "\"hi\""
        );
        assert_eq!(serde_json::to_string(&Value::Int(3)).expect("serialize"), "3");
        assert_eq!(
            serde_json::to_string(&Value::Null).expect("serialize"),
            "null"
        );
    }
}
