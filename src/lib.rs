//! # raven-core
//!
//! Parses markdown vault documents into a structured, addressable object graph.
//!
//! ## Overview
//!
//! Every markdown file in a vault becomes a [ParsedDocument]: a small tree of typed objects,
//! a flat list of inline trait annotations, and a flat list of wikilink references. Each item
//! carries a stable identifier and the lines it occupies. Storage, querying and schema
//! validation all build on this graph.
//!
//! A document contributes:
//!
//! - **The file object**, typed by the `type:` key of its YAML frontmatter (`page` by default)
//!   and carrying the remaining frontmatter keys as fields.
//! - **Embedded objects**: a heading followed by a `::typename(key=value, ...)` declaration.
//! - **Sections**: every other heading, typed `section`.
//! - **Traits**: `@name` or `@name(value)` annotations, bound to the nearest enclosing object.
//! - **References**: `[[target]]` or `[[target|display]]` links, bound the same way.
//!
//! Text inside code spans, code blocks and raw HTML is never scanned.
//!
//! ## Architecture
//!
//! - **[`codec`]**: the parse pipeline (frontmatter, structural walk, object assembly)
//! - **[`document`]**: the output graph types
//! - **[`properties`]**: [FieldValue], the typed value shared with the schema layer
//! - **[`paths`]**: file path and object ID mapping, heading slugs
//! - **[`config`]**: vault configuration (`raven.yaml`)
//!
//! ## Quick Start
//!
//! ```rust
//! use raven_core::{parse, ParseOptions};
//!
//! let content = "---\ntype: project\nstatus: active\n---\n\
//!                ## Standup\n::meeting(time=09:00)\n- @due(2026-01-15) ship it\n";
//! let options = ParseOptions::new(Some("objects/"), Some("pages/"));
//! let doc = parse(content, "objects/projects/raven.md", "", &options)?;
//!
//! assert_eq!(doc.file_id(), Some("projects/raven"));
//! assert_eq!(doc.objects[1].id, "projects/raven#standup");
//! assert_eq!(doc.objects[1].object_type, "meeting");
//! assert_eq!(doc.traits[0].value_str(), Some("2026-01-15"));
//! assert_eq!(doc.traits[0].parent_object_id, "projects/raven#standup");
//! # Ok::<(), raven_core::ParseError>(())
//! ```
//!
//! ## Concurrency
//!
//! [parse] is a pure function of its arguments. It does no I/O and shares no state, so a vault
//! reindex can parse files on as many threads as it likes. A file that fails with
//! [ParseError::UnterminatedFrontmatter] should be reported and skipped; it does not affect any
//! other file.

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod paths;
pub mod properties;

pub use codec::parse;
pub use config::VaultConfig;
pub use document::{ParseOptions, ParsedDocument, ParsedObject, ParsedRef, ParsedTrait};
pub use error::{ParseError, RavenError};
pub use properties::{FieldMap, FieldValue};

#[cfg(test)]
mod tests;
