//! Text to object graph.
//!
//! [parse] runs the stages in order:
//!
//! 1. [crate::paths] maps the file path onto the document's canonical ID.
//! 2. [frontmatter] splits off the YAML block and types the root object.
//! 3. [md] walks the body once for headings, type declarations, traits and wikilinks.
//! 4. [builder] assembles the object tree, binds traits and refs, then computes line spans.
//!
//! Each call is self-contained: no I/O, no shared state. Parsing a vault is one independent
//! call per file, on as many threads as the caller likes.

pub mod builder;
pub mod frontmatter;
pub mod inline;
pub mod md;
pub mod type_decl;

pub use builder::{compute_line_ends, find_parent_for_line};
pub use frontmatter::{extract_frontmatter, Frontmatter};
pub use md::{walk_body, BodyFacts};
pub use type_decl::{parse_field_value, parse_trait_value, parse_type_declaration, TypeDeclaration};

use crate::{
    document::{ParseOptions, ParsedDocument, ParsedObject, PAGE_TYPE},
    error::ParseError,
    paths::{file_path_to_object_id, vault_relative_path},
};

/// Parse one markdown document into its object graph.
///
/// `file_path` may be vault-relative or absolute. When it is absolute and lies under
/// `vault_path`, the vault prefix is stripped to get the relative path the document ID is
/// derived from. The only error is [ParseError::UnterminatedFrontmatter]; every other kind of
/// malformed input is recognised as far as it goes and left as text otherwise.
#[tracing::instrument(skip(content, options), fields(len = content.len()))]
pub fn parse(
    content: &str,
    file_path: &str,
    vault_path: &str,
    options: &ParseOptions,
) -> Result<ParsedDocument, ParseError> {
    let relative_path = vault_relative_path(file_path, vault_path);
    let file_id =
        file_path_to_object_id(&relative_path, options.objects_root(), options.pages_root());

    let split = extract_frontmatter(content)?;
    let (object_type, fields, frontmatter_refs) = match &split.frontmatter {
        Some(fm) => (
            fm.object_type.clone().unwrap_or_else(|| PAGE_TYPE.to_string()),
            fm.fields.clone(),
            fm.refs(),
        ),
        None => (PAGE_TYPE.to_string(), Default::default(), Vec::new()),
    };

    let root = ParsedObject {
        id: file_id.clone(),
        object_type,
        fields,
        heading_text: None,
        heading_level: None,
        parent_id: None,
        line_start: 1,
        line_end: None,
    };

    let mut facts = walk_body(split.body, split.body_start_line);
    // Ref offsets index the source line, which still carries any BOM the body was cut past.
    if split.body_start_column > 0 {
        for found in facts
            .refs
            .iter_mut()
            .filter(|found| found.line == split.body_start_line)
        {
            found.start += split.body_start_column;
            found.end += split.body_start_column;
        }
    }
    let mut objects = builder::build_objects(root, &facts.headings, &facts.type_decls);

    // Frontmatter has no nested objects: its refs always belong to the file.
    let mut refs = frontmatter_refs
        .into_iter()
        .map(|found| builder::into_parsed_ref(found, &file_id))
        .collect::<Vec<_>>();
    refs.extend(builder::bind_refs(&objects, facts.refs));
    let traits = builder::bind_traits(&objects, facts.traits);

    compute_line_ends(&mut objects);

    tracing::debug!(
        "parsed {}: {} objects, {} traits, {} refs",
        file_id,
        objects.len(),
        traits.len(),
        refs.len()
    );

    Ok(ParsedDocument {
        file_path: relative_path,
        raw_content: content.to_string(),
        objects,
        traits,
        refs,
    })
}
