//! Typed field values shared between the parser and the schema layer.
//!
//! [FieldValue] is a closed sum type. Dates, datetimes and references keep the text exactly as
//! written; the variant records which known shape the text matched. Serialization flattens a
//! value to its raw JSON form (`Ref("people/freya")` serializes as `"people/freya"`), which is
//! what the index layer stores.

use serde::{ser::SerializeSeq, Serialize, Serializer};
use std::{collections::BTreeMap, fmt};

/// Field name to value, ordered by name so output is deterministic.
pub type FieldMap = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Bool(bool),
    /// `YYYY-MM-DD`
    Date(String),
    /// `YYYY-MM-DDTHH:MM[:SS]`, optionally with an RFC 3339 offset
    Datetime(String),
    /// Unresolved target of a `[[wikilink]]`
    Ref(String),
    Array(Vec<FieldValue>),
    #[default]
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, FieldValue::Ref(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, FieldValue::Date(_))
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, FieldValue::Datetime(_))
    }

    /// The textual form of any string-shaped variant (String, Date, Datetime, Ref).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s)
            | FieldValue::Date(s)
            | FieldValue::Datetime(s)
            | FieldValue::Ref(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_ref_target(&self) -> Option<&str> {
        match self {
            FieldValue::Ref(target) => Some(target.as_str()),
            _ => None,
        }
    }

    /// Name of the variant, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Date(_) => "date",
            FieldValue::Datetime(_) => "datetime",
            FieldValue::Ref(_) => "ref",
            FieldValue::Array(_) => "array",
            FieldValue::Null => "null",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        FieldValue::Array(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s)
            | FieldValue::Date(s)
            | FieldValue::Datetime(s)
            | FieldValue::Ref(s) => write!(f, "{s}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Null => write!(f, "null"),
        }
    }
}

// Whole numbers within the exact f64 integer range serialize without a trailing ".0".
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::String(s)
            | FieldValue::Date(s)
            | FieldValue::Datetime(s)
            | FieldValue::Ref(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Null => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_raw_json() {
        let cases = vec![
            (FieldValue::from("hello"), r#""hello""#),
            (FieldValue::Number(42.0), "42"),
            (FieldValue::Number(1.5), "1.5"),
            (FieldValue::Bool(false), "false"),
            (FieldValue::Null, "null"),
            (FieldValue::Date("2025-01-01".into()), r#""2025-01-01""#),
            (FieldValue::Ref("people/freya".into()), r#""people/freya""#),
            (
                FieldValue::Array(vec!["a".into(), FieldValue::Number(2.0)]),
                r#"["a",2]"#,
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(serde_json::to_string(&value).unwrap(), expected);
        }
    }

    #[test]
    fn string_accessor_covers_string_shaped_variants() {
        assert_eq!(FieldValue::Ref("x".into()).as_str(), Some("x"));
        assert_eq!(FieldValue::Datetime("2026-01-15T09:00".into()).as_str(), Some("2026-01-15T09:00"));
        assert_eq!(FieldValue::Number(3.0).as_str(), None);
        assert_eq!(FieldValue::String("x".into()).as_ref_target(), None);
        assert!(FieldValue::default().is_null());
    }

    #[test]
    fn display_matches_source_text() {
        let value = FieldValue::Array(vec![FieldValue::Ref("a".into()), FieldValue::Bool(true)]);
        assert_eq!(value.to_string(), "[a, true]");
        assert_eq!(value.kind(), "array");
    }
}
