//! Shared utilities for crate-internal tests

use crate::{codec::parse, document::ParsedDocument, ParseOptions};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Parse `content` as `notes/doc.md` with no directory roots.
pub fn parse_doc(content: &str) -> ParsedDocument {
    init_logging();
    parse(content, "notes/doc.md", "", &ParseOptions::default()).expect("document parses")
}

/// `(id, parent_id, line_start, line_end)` for every object, in output order.
pub fn object_outline(doc: &ParsedDocument) -> Vec<(&str, Option<&str>, usize, Option<usize>)> {
    doc.objects
        .iter()
        .map(|o| (o.id.as_str(), o.parent_id.as_deref(), o.line_start, o.line_end))
        .collect()
}
