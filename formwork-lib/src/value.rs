//! Value enum for dynamic field values

use indexmap::IndexMap;
use serde::Deserialize;
use serde::{Serialize, Serializer};

/// A dynamic value held by a form node.
///
/// Fields hold scalar values; groups and arrays report their value as a
/// `Map` or `List` assembled from their children.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | boolean | `Bool` |
/// | number | `Number` |
/// | string | `Text` |
/// | array | `List` |
/// | object | `Map` |
///
/// # Example
///
/// ```
/// use formwork_lib::Value;
///
/// let name = Value::from("Contoso");
/// let rating = Value::from(4);
/// let accepted = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value. Whole numbers serialise without a fraction.
    #[serde(serialize_with = "serialize_number")]
    Number(f64),
    /// Text value.
    Text(String),
    /// Ordered list of values (array nodes).
    List(Vec<Value>),
    /// Named values in insertion order (group nodes).
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value counts as "nothing entered".
    ///
    /// Null, whitespace-only text and empty lists are empty. `false` and `0`
    /// are real answers and are not.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns the text if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric interpretation of this value.
    ///
    /// Text that parses as a finite number counts, since text inputs hand
    /// numbers over as strings. `NaN` is never a number.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        (!n.is_nan()).then_some(n)
    }

    /// Returns the character count of a text value.
    pub fn char_len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }
}

/// Largest magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*n as i64)
    } else {
        serializer.serialize_f64(*n)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "<{}>", other.type_name()),
            },
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::from("   \t").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(false).is_empty());
        assert!(!Value::from(0).is_empty());
        assert!(!Value::from(" x ").is_empty());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::from(3).as_number(), Some(3.0));
        assert_eq!(Value::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
        assert_eq!(Value::from(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_whole_numbers_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&Value::from(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::from(-2.0)).unwrap(), "-2");
        assert_eq!(serde_json::to_string(&Value::from(2.5)).unwrap(), "2.5");
        assert_eq!(Value::from(4).to_string(), "4");
    }

    #[test]
    fn test_json_shape() {
        let value: Value = serde_json::from_str(r#"{"b": [1, "x", null], "a": true}"#).unwrap();
        let Value::Map(map) = &value else {
            panic!("expected a map, got {}", value.type_name());
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            map["b"],
            Value::List(vec![Value::from(1), Value::from("x"), Value::Null])
        );
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"b":[1,"x",null],"a":true}"#
        );
    }
}
