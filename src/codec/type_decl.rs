//! Embedded type declarations and the value grammar they share with traits.
//!
//! A declaration sits on the line after a heading and has one of two shapes:
//!
//! ```text
//! ::meeting(time=09:00, attendees=[[[people/freya]], [[people/thor]]], id=standup)
//! ::meeting
//! ```
//!
//! The reserved `id` key supplies an explicit short ID for the embedded object. It is only
//! honoured when its value is string-like (a string, date, datetime or reference), and it is
//! also kept in the declared field map.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::properties::{FieldMap, FieldValue};

/// Field key whose value becomes the embedded object's explicit ID.
pub const ID_KEY: &str = "id";

static TYPE_DECL_WITH_ARGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^::([\w-]+)\s*\(([^)]*)\)\s*$").expect("type declaration regex is valid")
});
static TYPE_DECL_NO_ARGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^::([\w-]+)\s*$").expect("type declaration regex is valid"));
static EXACT_WIKILINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]$").expect("wikilink regex is valid")
});
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex is valid"));
static NAIVE_DATETIME_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?$").expect("datetime regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub type_name: String,
    /// Explicit short ID from the reserved `id` key, if any.
    pub id: Option<String>,
    pub fields: FieldMap,
    /// 1-indexed document line of the declaration.
    pub line: usize,
}

/// Parse `line` as an embedded type declaration.
///
/// Returns `None` when the line is not a declaration. Lines that start with `::` but do not
/// fit the grammar are also `None`; they stay ordinary paragraph text.
pub fn parse_type_declaration(line: &str, line_number: usize) -> Option<TypeDeclaration> {
    let trimmed = line.trim();
    if !trimmed.starts_with("::") {
        return None;
    }

    if let Some(caps) = TYPE_DECL_WITH_ARGS.captures(trimmed) {
        let fields = parse_arguments(&caps[2]);
        let id = fields
            .get(ID_KEY)
            .and_then(FieldValue::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        return Some(TypeDeclaration {
            type_name: caps[1].to_string(),
            id,
            fields,
            line: line_number,
        });
    }

    if let Some(caps) = TYPE_DECL_NO_ARGS.captures(trimmed) {
        return Some(TypeDeclaration {
            type_name: caps[1].to_string(),
            id: None,
            fields: FieldMap::new(),
            line: line_number,
        });
    }

    tracing::debug!(
        "line {}: {:?} looks like a type declaration but does not parse",
        line_number,
        trimmed
    );
    None
}

/// Split `key=value, key2=value2` into a field map.
///
/// Commas and `=` inside quotes or brackets do not split. Pairs with an empty key are dropped;
/// a later duplicate key replaces an earlier one.
fn parse_arguments(args: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    if args.trim().is_empty() {
        return fields;
    }

    let mut key = String::new();
    let mut value = String::new();
    let mut in_key = true;
    let mut in_quotes = false;
    let mut depth = 0usize;

    let mut finish = |key: &mut String, value: &mut String| {
        let name = key.trim();
        if !name.is_empty() {
            fields.insert(name.to_string(), parse_field_value(value));
        }
        key.clear();
        value.clear();
    };

    for c in args.chars() {
        match c {
            '"' => {
                if depth == 0 {
                    in_quotes = !in_quotes;
                }
                value.push(c);
            }
            '[' => {
                if !in_quotes {
                    depth += 1;
                }
                value.push(c);
            }
            ']' => {
                if !in_quotes {
                    depth = depth.saturating_sub(1);
                }
                value.push(c);
            }
            '=' if in_key && !in_quotes && depth == 0 => in_key = false,
            ',' if !in_quotes && depth == 0 => {
                finish(&mut key, &mut value);
                in_key = true;
            }
            _ if in_key => key.push(c),
            _ => value.push(c),
        }
    }
    finish(&mut key, &mut value);
    fields
}

#[derive(Debug, Clone, Copy)]
struct ValueGrammar {
    arrays: bool,
    quotes: bool,
    booleans: bool,
    numbers: bool,
}

const FIELD_GRAMMAR: ValueGrammar = ValueGrammar {
    arrays: true,
    quotes: true,
    booleans: true,
    numbers: true,
};

const TRAIT_GRAMMAR: ValueGrammar = ValueGrammar {
    arrays: false,
    quotes: false,
    booleans: false,
    numbers: false,
};

/// Parse a declaration argument value.
///
/// Order of recognition: empty (Null), exact wikilink (Ref), `[..]` (Array), `".."` (String),
/// `true`/`false`, finite number, datetime, date, and finally a plain String.
pub fn parse_field_value(raw: &str) -> FieldValue {
    parse_value(raw, FIELD_GRAMMAR)
}

/// Parse the value inside `@trait(value)`.
///
/// Only references, dates and datetimes are recognised. Everything else, numbers and booleans
/// included, stays the literal String.
pub fn parse_trait_value(raw: &str) -> FieldValue {
    parse_value(raw, TRAIT_GRAMMAR)
}

fn parse_value(raw: &str, grammar: ValueGrammar) -> FieldValue {
    let s = raw.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }

    if !s.starts_with("[[[") {
        if let Some(target) = exact_wikilink_target(s) {
            return FieldValue::Ref(target.to_string());
        }
    }

    if grammar.arrays && s.len() >= 2 && s.starts_with('[') && s.ends_with(']') {
        return FieldValue::Array(parse_array_items(&s[1..s.len() - 1], grammar));
    }

    if grammar.quotes && s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return FieldValue::String(s[1..s.len() - 1].to_string());
    }

    if grammar.booleans {
        match s {
            "true" => return FieldValue::Bool(true),
            "false" => return FieldValue::Bool(false),
            _ => {}
        }
    }

    if grammar.numbers {
        if let Ok(n) = s.parse::<f64>() {
            if n.is_finite() {
                return FieldValue::Number(n);
            }
        }
    }

    if is_valid_datetime(s) {
        return FieldValue::Datetime(s.to_string());
    }
    if is_valid_date(s) {
        return FieldValue::Date(s.to_string());
    }

    FieldValue::String(s.to_string())
}

fn parse_array_items(inner: &str, grammar: ValueGrammar) -> Vec<FieldValue> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;

    let mut push_item = |current: &mut String| {
        let item = parse_value(current, grammar);
        if !item.is_null() {
            items.push(item);
        }
        current.clear();
    };

    for c in inner.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => push_item(&mut current),
            _ => current.push(c),
        }
    }
    push_item(&mut current);
    items
}

/// Target of `s` when the whole of `s` is one `[[target]]` or `[[target|display]]`.
pub fn exact_wikilink_target(s: &str) -> Option<&str> {
    let caps = EXACT_WIKILINK.captures(s.trim())?;
    let target = caps.get(1)?.as_str().trim();
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_valid_date(s: &str) -> bool {
    DATE_SHAPE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// RFC 3339, or `YYYY-MM-DDTHH:MM` with optional `:SS`.
pub fn is_valid_datetime(s: &str) -> bool {
    if NAIVE_DATETIME_SHAPE.is_match(s) {
        return NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
            || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok();
    }
    s.len() >= 20 && s.as_bytes()[10] == b'T' && DateTime::parse_from_rfc3339(s).is_ok()
}

/// Render a declaration line that [parse_type_declaration] reads back to the same fields.
///
/// Fields are written in name order. Null fields are omitted, and strings containing grammar
/// characters are quoted.
pub fn serialize_type_declaration(type_name: &str, fields: &FieldMap) -> String {
    let args = fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| format!("{key}={}", serialize_value(value)))
        .collect::<Vec<_>>();
    format!("::{type_name}({})", args.join(", "))
}

fn serialize_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Ref(target) => format!("[[{target}]]"),
        FieldValue::Array(items) => {
            let inner = items.iter().map(serialize_value).collect::<Vec<_>>();
            format!("[{}]", inner.join(", "))
        }
        FieldValue::String(s) if s.contains([',', '(', ')', '[', ']', '=', '"']) => {
            format!("\"{s}\"")
        }
        other => other.to_string(),
    }
}
