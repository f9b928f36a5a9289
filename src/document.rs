//! The object graph produced for one document.
//!
//! All structures are plain values owned by the [ParsedDocument] that holds them. Parent links
//! are object IDs, never pointers, so the graph can be cloned, sent across threads, and
//! serialized without any cycle handling.

use serde::{Deserialize, Serialize};

use crate::properties::{FieldMap, FieldValue};

/// Object type given to a file whose frontmatter names no type.
pub const PAGE_TYPE: &str = "page";
/// Object type given to a heading that has no embedded type declaration.
pub const SECTION_TYPE: &str = "section";

/// Directory prefixes that decide how file paths map onto object IDs.
///
/// Roots are expected in the form produced by [crate::paths::normalize_dir_root] (`"objects/"`),
/// but any spelling is tolerated and normalized before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_root: Option<String>,
}

impl ParseOptions {
    pub fn new(objects_root: Option<&str>, pages_root: Option<&str>) -> ParseOptions {
        ParseOptions {
            objects_root: objects_root.map(str::to_string),
            pages_root: pages_root.map(str::to_string),
        }
    }

    pub fn objects_root(&self) -> &str {
        self.objects_root.as_deref().unwrap_or_default()
    }

    pub fn pages_root(&self) -> &str {
        self.pages_root.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    /// Vault-relative path, `/`-separated.
    pub file_path: String,
    /// Source text, kept for downstream full-text indexing.
    pub raw_content: String,
    pub objects: Vec<ParsedObject>,
    pub traits: Vec<ParsedTrait>,
    pub refs: Vec<ParsedRef>,
}

impl ParsedDocument {
    /// The object representing the whole file. [crate::parse] always emits it first.
    pub fn root(&self) -> Option<&ParsedObject> {
        self.objects.first()
    }

    pub fn file_id(&self) -> Option<&str> {
        self.root().map(|obj| obj.id.as_str())
    }

    pub fn object(&self, id: &str) -> Option<&ParsedObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ParsedObject> + 'a {
        self.objects
            .iter()
            .filter(move |obj| obj.parent_id.as_deref() == Some(id))
    }

    pub fn traits_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ParsedTrait> + 'a {
        self.traits.iter().filter(move |t| t.trait_name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedObject {
    /// `file_id` for the root, `file_id#slug` for heading-derived objects.
    pub id: String,
    pub object_type: String,
    pub fields: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub line_start: usize,
    /// Inclusive. `None` means the object extends to the end of the file.
    ///
    /// One before the next object's `line_start`, so a root whose file opens with a heading on
    /// line 1 ends on line 0: its span is empty and [ParsedObject::contains_line] is false for
    /// every line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_end: Option<usize>,
}

impl ParsedObject {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.line_start <= line && self.line_end.map_or(true, |end| line <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTrait {
    pub trait_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// The annotated line with all trait markup removed.
    pub content: String,
    pub parent_object_id: String,
    pub line: usize,
}

impl ParsedTrait {
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(FieldValue::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRef {
    pub source_id: String,
    /// Target exactly as written (trimmed), not resolved.
    pub target_raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub line: usize,
    /// Byte offset of `[[` within the line.
    pub start: usize,
    /// Byte offset just past `]]` within the line.
    pub end: usize,
}
