//! Line scanners for trait annotations (`@due(2026-01-15)`) and wikilinks (`[[target|display]]`).
//!
//! Scanners work on one line at a time and report byte offsets into that line. The structural
//! walker feeds them lines whose code spans have already been blanked out, so anything found
//! here is outside code.

use once_cell::sync::Lazy;
use regex::Regex;

use super::type_decl::parse_trait_value;
use crate::properties::FieldValue;

// The leading group stands in for a lookbehind: `@` must start the line or follow whitespace
// or opening punctuation, so `me@example.com` is not a trait.
static TRAIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s(\[{*_~>"'-])@(\w+(?:-\w+)*)(?:\(([^)]*)\))?"#)
        .expect("trait regex is valid")
});
static WIKILINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\]\[|]+)(?:\|([^\]]+))?\]\]").expect("wikilink regex is valid")
});
static BLOCK_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\s*(?:>|[-*+](?:\s|$)|\d{1,9}[.)](?:\s|$)))*\s*")
        .expect("block prefix regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct TraitMatch {
    pub name: String,
    /// `None` for `@name` and `@name()`.
    pub value: Option<FieldValue>,
    /// Offset of the `@`.
    pub start: usize,
    /// Offset just past the name, or past the closing `)` when a value is given.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikilinkMatch {
    pub target: String,
    pub display_text: Option<String>,
    pub start: usize,
    pub end: usize,
}

pub fn find_traits(line: &str) -> Vec<TraitMatch> {
    TRAIT
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            let value = caps
                .get(2)
                .map(|raw| parse_trait_value(raw.as_str()))
                .filter(|value| !value.is_null());
            Some(TraitMatch {
                name: name.as_str().to_string(),
                value,
                // `@` sits directly before the name.
                start: name.start() - 1,
                end: whole.end(),
            })
        })
        .collect()
}

/// Find `[[target]]` and `[[target|display]]` occurrences in `line`.
///
/// Unless `allow_triple` is set, a match directly preceded by `[` is skipped: in body text
/// `[[[a]], [[b]]]` is array syntax, not a link.
pub fn find_wikilinks(line: &str, allow_triple: bool) -> Vec<WikilinkMatch> {
    WIKILINK
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if !allow_triple && line[..whole.start()].ends_with('[') {
                return None;
            }
            let target = caps.get(1)?.as_str().trim();
            if target.is_empty() {
                return None;
            }
            let display_text = caps
                .get(2)
                .map(|display| display.as_str().trim())
                .filter(|display| !display.is_empty())
                .map(str::to_string);
            Some(WikilinkMatch {
                target: target.to_string(),
                display_text,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Length in bytes of the block markup (indentation, `>` markers, list bullets or numbers)
/// at the start of `line`.
pub fn block_prefix_len(line: &str) -> usize {
    BLOCK_PREFIX.find(line).map_or(0, |m| m.end())
}

/// The text a trait annotates: `line` without its block prefix and without any trait markup,
/// whitespace collapsed. Inline code is kept verbatim.
pub fn strip_trait_annotations(line: &str) -> String {
    trait_content(line, &find_traits(line))
}

/// As [strip_trait_annotations], for spans already found on an equal-length (masked) copy of
/// `line`.
pub(crate) fn trait_content(line: &str, traits: &[TraitMatch]) -> String {
    let prefix = block_prefix_len(line);
    let mut kept = String::with_capacity(line.len());
    let mut cursor = prefix;
    for span in traits {
        if span.end <= cursor {
            continue;
        }
        let start = span.start.max(cursor);
        if let Some(text) = line.get(cursor..start) {
            kept.push_str(text);
        }
        cursor = span.end;
    }
    if let Some(rest) = line.get(cursor..) {
        kept.push_str(rest);
    }
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
