//! Raw request parameter values.

use serde::{Deserialize, Serialize};

/// A raw request parameter: either one string or a sequence of strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum ParamValue {
    /// Single value (`key=value`)
    Single(String),
    /// Repeated value (`key[]=a&key[]=b`)
    Many(Vec<String>),
}

impl ParamValue {
    /// Whether the value counts as not filled in.
    ///
    /// An empty string, a literal `"0"` and an empty sequence are empty.
    /// Whitespace is content.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty() || value == "0",
            ParamValue::Many(values) => values.is_empty(),
        }
    }

    /// The single value, if this is not a sequence.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Many(_) => None,
        }
    }

    /// Append another occurrence of the same key, promoting to a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(first) => {
                *self = ParamValue::Many(vec![std::mem::take(first), value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::Many(values.into_iter().map(str::to_string).collect())
    }
}
