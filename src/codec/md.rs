//! Structural walk over a document body.
//!
//! One pulldown-cmark pass collects headings and the paragraph that directly follows each one
//! (a candidate type declaration). It also records which byte ranges may carry traits and
//! wikilinks: paragraphs, list items and tables, minus code, HTML, headings and consumed
//! declaration lines. The body is then blanked outside those ranges. Blanking replaces each
//! byte with an ASCII space, so line breaks and byte offsets stay where they were, and the
//! inline scanners can run line by line over the result.

use pulldown_cmark::{
    Event as MdEvent, HeadingLevel, Options, Parser as MdParser, Tag as MdTag, TagEnd as MdTagEnd,
};
use std::{collections::BTreeMap, ops::Range};

use super::{
    inline::{find_traits, find_wikilinks, trait_content},
    type_decl::{parse_type_declaration, TypeDeclaration},
};
use crate::properties::FieldValue;

pub use pulldown_cmark;

pub fn raven_md_options() -> Options {
    let mut md_options = Options::empty();
    // Enabled explicitly rather than via Options::all() so parsing stays reproducible. Wikilink
    // and metadata-block extensions stay off: both are handled by raven's own scanners.
    md_options.insert(Options::ENABLE_FOOTNOTES);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_TASKLISTS);
    md_options
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitOccurrence {
    pub name: String,
    pub value: Option<FieldValue>,
    pub content: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOccurrence {
    pub target: String,
    pub display_text: Option<String>,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// Everything structural found in a document body, all keyed by document line numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyFacts {
    pub headings: Vec<Heading>,
    /// Heading line to the declaration bound to that heading.
    pub type_decls: BTreeMap<usize, TypeDeclaration>,
    pub traits: Vec<TraitOccurrence>,
    pub refs: Vec<RefOccurrence>,
}

/// Byte range of each line's content, terminator excluded.
///
/// `\n`, `\r\n` and a bare `\r` each end a line, matching how pulldown-cmark splits lines.
/// Text ending in a terminator has a final empty line.
pub fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => {
                ranges.push(start..idx);
                idx += 1;
                start = idx;
            }
            b'\r' => {
                ranges.push(start..idx);
                idx += if bytes.get(idx + 1) == Some(&b'\n') { 2 } else { 1 };
                start = idx;
            }
            _ => idx += 1,
        }
    }
    ranges.push(start..bytes.len());
    ranges
}

/// Byte offset of every line start, for offset to line number conversion.
struct LineIndex {
    starts: Vec<usize>,
    first_line: usize,
}

impl LineIndex {
    fn new(text: &str, first_line: usize) -> LineIndex {
        let starts = line_ranges(text).into_iter().map(|range| range.start).collect();
        LineIndex { starts, first_line }
    }

    fn line_of(&self, offset: usize) -> usize {
        let idx = self.starts.partition_point(|start| *start <= offset);
        self.first_line + idx.saturating_sub(1)
    }

    fn line_start_offset(&self, offset: usize) -> usize {
        let idx = self.starts.partition_point(|start| *start <= offset);
        self.starts[idx.saturating_sub(1)]
    }
}

struct HeadingAccumulator {
    level: u8,
    line: usize,
    text: String,
}

fn heading_level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Walk `body`, whose first line is document line `first_line`.
///
/// Never fails: markup that does not parse as a heading, declaration, trait or link is left as
/// plain text.
#[tracing::instrument(skip_all, fields(first_line = first_line, len = body.len()))]
pub fn walk_body(body: &str, first_line: usize) -> BodyFacts {
    let lines = LineIndex::new(body, first_line);
    let mut facts = BodyFacts::default();

    let mut scan_ranges: Vec<Range<usize>> = Vec::new();
    let mut blocked_ranges: Vec<Range<usize>> = Vec::new();
    let mut heading: Option<HeadingAccumulator> = None;
    let mut awaiting_decl: Option<usize> = None;

    for (event, range) in MdParser::new_ext(body, raven_md_options()).into_offset_iter() {
        if let Some(heading_line) = awaiting_decl.take() {
            if let MdEvent::Start(MdTag::Paragraph) = &event {
                if let Some(consumed) =
                    bind_type_declaration(body, &range, heading_line, &lines, &mut facts)
                {
                    blocked_ranges.push(consumed);
                }
            }
        }

        match &event {
            MdEvent::Start(MdTag::Heading { level, .. }) => {
                blocked_ranges.push(range.clone());
                heading = Some(HeadingAccumulator {
                    level: heading_level_number(*level),
                    line: lines.line_of(range.start),
                    text: String::new(),
                });
            }
            MdEvent::End(MdTagEnd::Heading(_)) => {
                if let Some(acc) = heading.take() {
                    let text = acc.text.trim();
                    if text.is_empty() {
                        tracing::debug!("line {}: heading without text ignored", acc.line);
                    } else {
                        facts.headings.push(Heading {
                            text: text.to_string(),
                            level: acc.level,
                            line: acc.line,
                        });
                        awaiting_decl = Some(acc.line);
                    }
                }
            }
            MdEvent::Text(text) | MdEvent::Code(text) if heading.is_some() => {
                if let Some(acc) = heading.as_mut() {
                    acc.text.push_str(text);
                }
            }
            MdEvent::SoftBreak | MdEvent::HardBreak if heading.is_some() => {
                if let Some(acc) = heading.as_mut() {
                    acc.text.push(' ');
                }
            }
            MdEvent::Start(MdTag::Paragraph | MdTag::Item | MdTag::Table(_)) => {
                scan_ranges.push(range.clone());
            }
            MdEvent::Start(MdTag::CodeBlock(_) | MdTag::HtmlBlock)
            | MdEvent::Code(_)
            | MdEvent::Html(_)
            | MdEvent::InlineHtml(_) => {
                blocked_ranges.push(range.clone());
            }
            _ => {}
        }
    }

    let scannable = blank_unscannable(body, &scan_ranges, &blocked_ranges);
    for (idx, range) in line_ranges(body).into_iter().enumerate() {
        let (Some(source_line), Some(scan_line)) =
            (body.get(range.clone()), scannable.get(range))
        else {
            continue;
        };
        if scan_line.trim().is_empty() {
            continue;
        }
        let line = first_line + idx;

        let traits = find_traits(scan_line);
        if !traits.is_empty() {
            let content = trait_content(source_line, &traits);
            facts.traits.extend(traits.into_iter().map(|found| TraitOccurrence {
                name: found.name,
                value: found.value,
                content: content.clone(),
                line,
            }));
        }

        facts
            .refs
            .extend(find_wikilinks(scan_line, false).into_iter().map(|link| RefOccurrence {
                target: link.target,
                display_text: link.display_text,
                line,
                start: link.start,
                end: link.end,
            }));
    }
    // Declaration refs were pushed while walking; keep refs in document order.
    facts.refs.sort_by_key(|r| (r.line, r.start));

    tracing::debug!(
        "walked body: {} headings, {} type declarations, {} traits, {} refs",
        facts.headings.len(),
        facts.type_decls.len(),
        facts.traits.len(),
        facts.refs.len()
    );
    facts
}

/// Test the first line of the paragraph at `range` as a type declaration for the heading on
/// `heading_line`. Returns the consumed byte range when it is one.
fn bind_type_declaration(
    body: &str,
    range: &Range<usize>,
    heading_line: usize,
    lines: &LineIndex,
    facts: &mut BodyFacts,
) -> Option<Range<usize>> {
    let paragraph = body.get(range.clone())?;
    let first_line_len = paragraph.find(['\n', '\r']).unwrap_or(paragraph.len());
    let candidate = &paragraph[..first_line_len];
    let decl_line = lines.line_of(range.start);
    let decl = parse_type_declaration(candidate, decl_line)?;

    // Links on the declaration line belong to the embedded object; array syntax
    // (`[[[a]], [[b]]]`) is expected here, so triple brackets count.
    let column = range.start - lines.line_start_offset(range.start);
    facts
        .refs
        .extend(find_wikilinks(candidate, true).into_iter().map(|link| RefOccurrence {
            target: link.target,
            display_text: link.display_text,
            line: decl_line,
            start: column + link.start,
            end: column + link.end,
        }));
    facts.type_decls.insert(heading_line, decl);
    Some(range.start..range.start + first_line_len)
}

/// Copy of `body` with every byte outside the scan ranges (or inside a blocked range) replaced
/// by a space. Line terminators are always kept.
fn blank_unscannable(body: &str, scan: &[Range<usize>], blocked: &[Range<usize>]) -> String {
    let mut keep = vec![false; body.len()];
    for range in scan {
        if let Some(slice) = keep.get_mut(range.clone()) {
            slice.fill(true);
        }
    }
    for range in blocked {
        if let Some(slice) = keep.get_mut(range.clone()) {
            slice.fill(false);
        }
    }

    let mut blanked = String::with_capacity(body.len());
    for (idx, c) in body.char_indices() {
        if c == '\n' || c == '\r' || keep[idx] {
            blanked.push(c);
        } else {
            blanked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }
    blanked
}
