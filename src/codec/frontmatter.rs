//! Leading YAML frontmatter.
//!
//! ```text
//! ---
//! type: project
//! owner: "[[people/freya]]"
//! ---
//! # Body starts here
//! ```
//!
//! The opening delimiter must be the first line (a UTF-8 BOM and trailing whitespace are
//! tolerated). Lines may end in `\n`, `\r\n` or a bare `\r`. A block that opens but never
//! closes is the one hard error of the parser. YAML that fails to parse is not an error: the
//! document keeps its body and gets no fields.

use serde_yaml::Value as YamlValue;

use super::{
    inline::find_wikilinks,
    md::{line_ranges, RefOccurrence},
    type_decl::{exact_wikilink_target, is_valid_date, is_valid_datetime},
};
use crate::{
    error::ParseError,
    properties::{FieldMap, FieldValue},
};

const DELIMITER: &str = "---";
const TYPE_KEY: &str = "type";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Value of a non-empty string `type:` key.
    pub object_type: Option<String>,
    /// Every other top-level key.
    pub fields: FieldMap,
    /// Text between the delimiters, without the delimiter lines.
    pub raw: String,
    /// Document line of the closing delimiter.
    pub end_line: usize,
}

impl Frontmatter {
    /// Wikilinks anywhere in the raw block, triple-bracket arrays included. Lines count from 2,
    /// the line after the opening delimiter.
    pub fn refs(&self) -> Vec<RefOccurrence> {
        line_ranges(&self.raw)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, range)| self.raw.get(range).map(|line| (idx, line)))
            .flat_map(|(idx, line)| {
                find_wikilinks(line, true).into_iter().map(move |link| RefOccurrence {
                    target: link.target,
                    display_text: link.display_text,
                    line: idx + 2,
                    start: link.start,
                    end: link.end,
                })
            })
            .collect()
    }
}

/// A document split into its optional frontmatter and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    pub frontmatter: Option<Frontmatter>,
    pub body: &'a str,
    /// Document line on which `body` starts.
    pub body_start_line: usize,
    /// Byte column of `body` within its first source line. Non-zero only when a BOM precedes
    /// a body with no frontmatter.
    pub body_start_column: usize,
}

fn is_delimiter(line: &str) -> bool {
    line.trim() == DELIMITER
}

/// Split `content` into frontmatter and body.
pub fn extract_frontmatter(content: &str) -> Result<SplitDocument<'_>, ParseError> {
    let source = content;
    let content = source.strip_prefix('\u{feff}').unwrap_or(source);
    let no_frontmatter = SplitDocument {
        frontmatter: None,
        body: content,
        body_start_line: 1,
        body_start_column: source.len() - content.len(),
    };

    let lines = line_ranges(content);
    let opens = lines
        .first()
        .and_then(|first| content.get(first.clone()))
        .is_some_and(is_delimiter);
    if !opens {
        return Ok(no_frontmatter);
    }

    let next_start = |idx: usize| lines.get(idx + 1).map_or(content.len(), |r| r.start);
    let raw_start = next_start(0);
    for (idx, range) in lines.iter().enumerate().skip(1) {
        if content.get(range.clone()).is_some_and(is_delimiter) {
            let end_line = idx + 1;
            let raw = content[raw_start..range.start].trim_end_matches(['\n', '\r']);
            let (object_type, fields) = parse_yaml_block(raw);
            return Ok(SplitDocument {
                frontmatter: Some(Frontmatter {
                    object_type,
                    fields,
                    raw: raw.to_string(),
                    end_line,
                }),
                body: &content[next_start(idx)..],
                body_start_line: end_line + 1,
                body_start_column: 0,
            });
        }
    }

    Err(ParseError::UnterminatedFrontmatter { line: 1 })
}

fn parse_yaml_block(raw: &str) -> (Option<String>, FieldMap) {
    let mut fields = FieldMap::new();
    if raw.trim().is_empty() {
        return (None, fields);
    }

    let mapping = match serde_yaml::from_str::<YamlValue>(raw) {
        Ok(YamlValue::Mapping(mapping)) => mapping,
        Ok(YamlValue::Null) => return (None, fields),
        Ok(other) => {
            tracing::debug!("frontmatter is a YAML {:?}, not a mapping; ignoring it", yaml_kind(&other));
            return (None, fields);
        }
        Err(err) => {
            tracing::warn!("frontmatter is not valid YAML, treating it as empty: {}", err);
            return (None, fields);
        }
    };

    let mut object_type = None;
    for (key, value) in mapping {
        let Some(key) = yaml_key(&key) else {
            tracing::debug!("skipping frontmatter key that is not a scalar: {:?}", key);
            continue;
        };
        if key == TYPE_KEY {
            object_type = value
                .as_str()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            continue;
        }
        fields.insert(key, yaml_to_field_value(&value));
    }
    (object_type, fields)
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

/// Convert a YAML value into the closest [FieldValue].
///
/// Strings that are exactly one wikilink become references, and strings that are valid dates
/// or datetimes keep that shape. Nested mappings have no field representation and become Null.
pub fn yaml_to_field_value(value: &YamlValue) -> FieldValue {
    match value {
        YamlValue::Null => FieldValue::Null,
        YamlValue::Bool(b) => FieldValue::Bool(*b),
        YamlValue::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
        YamlValue::String(s) => string_field_value(s),
        YamlValue::Sequence(items) => {
            FieldValue::Array(items.iter().map(yaml_to_field_value).collect())
        }
        YamlValue::Mapping(_) => FieldValue::Null,
        YamlValue::Tagged(tagged) => yaml_to_field_value(&tagged.value),
    }
}

fn string_field_value(s: &str) -> FieldValue {
    if let Some(target) = exact_wikilink_target(s) {
        return FieldValue::Ref(target.to_string());
    }
    let trimmed = s.trim();
    if is_valid_datetime(trimmed) {
        FieldValue::Datetime(trimmed.to_string())
    } else if is_valid_date(trimmed) {
        FieldValue::Date(trimmed.to_string())
    } else {
        FieldValue::String(s.to_string())
    }
}
