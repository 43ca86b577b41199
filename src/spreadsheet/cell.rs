use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::Display;

/// A single cell value as read from or written to a grid.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Blank cell; reads as an empty string
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Date/time values
    Date(NaiveDateTime),
}

impl Value {
    /// Returns true for blank cells, including cells holding an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::String(value) => value.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Empty => Some(""),
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Orders two values of the same kind.
    /// Blank cells order as the empty string; values of different kinds are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(left), Value::Number(right)) => left.partial_cmp(right),
            (Value::Boolean(left), Value::Boolean(right)) => Some(left.cmp(right)),
            (Value::Date(left), Value::Date(right)) => Some(left.cmp(right)),
            _ => match (self.as_str(), other.as_str()) {
                (Some(left), Some(right)) => Some(left.cmp(right)),
                _ => None,
            },
        }
    }
}

impl PartialEq for Value {
    /// Strict equality: same kind and same value. A blank cell equals the empty string.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Date(left), Value::Date(right)) => left == right,
            _ => match (self.as_str(), other.as_str()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Number(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Date(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<serde_json::Value> for Value {
    /// Converts a JSON scalar into a cell value.
    /// Arrays and objects have no cell representation and are kept as their JSON text.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Empty,
            serde_json::Value::Bool(value) => Value::Boolean(value),
            serde_json::Value::Number(value) => {
                value.as_f64().map(Value::Number).unwrap_or_default()
            }
            serde_json::Value::String(value) => Value::String(value),
            other => Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_equals_empty_string() {
        assert_eq!(Value::Empty, Value::from(""));
        assert_ne!(Value::Empty, Value::from(0));
        assert!(Value::from("").is_empty());
    }

    #[test]
    fn strict_equality_between_kinds() {
        assert_ne!(Value::from("18"), Value::from(18));
        assert_eq!(Value::from(18), Value::from(18.0));
        assert_ne!(Value::from(true), Value::from(1));
    }

    #[test]
    fn ordering_requires_same_kind() {
        assert!(Value::from(2) > Value::from(1));
        assert!(Value::from("b") > Value::from("a"));
        assert_eq!(Value::from("2").compare(&Value::from(1)), None);
        assert!(!(Value::from("2") > Value::from(1)));

        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date literal");
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date literal");
        assert!(Value::from(earlier) < Value::from(later));
    }

    #[test]
    fn display_matches_cell_text() {
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::Empty.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date literal");
        assert_eq!(Value::from(date).to_string(), "2024-03-09 00:00:00");
    }

    #[test]
    fn from_json_scalars() {
        assert_eq!(Value::from(serde_json::json!(3)), Value::from(3));
        assert_eq!(Value::from(serde_json::json!("x")), Value::from("x"));
        assert!(matches!(Value::from(serde_json::json!(null)), Value::Empty));
        assert!(matches!(Value::from(serde_json::json!(false)), Value::Boolean(false)));
    }
}
