//! Mapping between vault-relative markdown paths and canonical object IDs.
//!
//! Typed objects usually live under an objects root (`objects/people/freya.md` is
//! `people/freya`) and untyped pages under a pages root. All functions here are pure string
//! transforms; roots may be given in any spelling and are normalized first.

use super::path::{normalize_dir_root, normalize_rel_path};
use crate::document::PAGE_TYPE;

const MD_EXT: &str = ".md";

fn strip_md(path: &str) -> &str {
    path.strip_suffix(MD_EXT).unwrap_or(path)
}

fn strip_root<'a>(id: &'a str, root: &str) -> Option<&'a str> {
    if root.is_empty() {
        None
    } else {
        id.strip_prefix(root)
    }
}

/// Convert a vault-relative file path into an object ID.
///
/// The objects root is stripped in preference to the pages root, since typed objects tend to
/// sit deeper in the tree.
pub fn file_path_to_object_id(file_path: &str, objects_root: &str, pages_root: &str) -> String {
    let normalized = normalize_rel_path(file_path);
    let id = strip_md(&normalized);
    let objects_root = normalize_dir_root(objects_root);
    let pages_root = normalize_dir_root(pages_root);

    strip_root(id, &objects_root)
        .or_else(|| strip_root(id, &pages_root))
        .unwrap_or(id)
        .to_string()
}

/// Convert an object ID into the vault-relative path of its markdown file.
///
/// Untyped pages (`type_name` empty or `"page"`) go under the pages root, falling back to the
/// objects root; everything else goes under the objects root. An ID that already carries a
/// configured root is only given the extension.
pub fn object_id_to_file_path(
    object_id: &str,
    type_name: &str,
    objects_root: &str,
    pages_root: &str,
) -> String {
    let normalized = normalize_rel_path(object_id);
    let id = strip_md(&normalized);
    let objects_root = normalize_dir_root(objects_root);
    let pages_root = normalize_dir_root(pages_root);

    if strip_root(id, &objects_root).is_some() || strip_root(id, &pages_root).is_some() {
        return format!("{id}{MD_EXT}");
    }

    let root = if type_name.is_empty() || type_name == PAGE_TYPE {
        if pages_root.is_empty() {
            &objects_root
        } else {
            &pages_root
        }
    } else {
        &objects_root
    };
    format!("{root}{id}{MD_EXT}")
}

/// Vault-relative paths to try when resolving a reference, most literal first.
pub fn candidate_file_paths(reference: &str, objects_root: &str, pages_root: &str) -> Vec<String> {
    let normalized = normalize_rel_path(reference);
    let reference = strip_md(&normalized);
    let objects_root = normalize_dir_root(objects_root);
    let pages_root = normalize_dir_root(pages_root);

    let mut candidates = vec![format!("{reference}{MD_EXT}")];
    for root in [&objects_root, &pages_root] {
        if root.is_empty() || reference.starts_with(root.as_str()) {
            continue;
        }
        let candidate = format!("{root}{reference}{MD_EXT}");
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_to_object_id_strips_roots() {
        assert_eq!(
            file_path_to_object_id("objects/people/freya.md", "objects/", "pages/"),
            "people/freya"
        );
        assert_eq!(file_path_to_object_id("pages/my-note.md", "objects/", "pages/"), "my-note");
        assert_eq!(file_path_to_object_id("other/thing.md", "objects/", "pages/"), "other/thing");
        assert_eq!(file_path_to_object_id("./daily/2026-01-15.md", "", ""), "daily/2026-01-15");
        // Roots without a trailing slash still only match whole directories.
        assert_eq!(file_path_to_object_id("objectsfoo/x.md", "objects", ""), "objectsfoo/x");
    }

    #[test]
    fn object_id_to_file_path_picks_root_by_type() {
        assert_eq!(
            object_id_to_file_path("my-note", "page", "objects/", "pages/"),
            "pages/my-note.md"
        );
        assert_eq!(object_id_to_file_path("my-note", "", "objects/", "pages/"), "pages/my-note.md");
        assert_eq!(
            object_id_to_file_path("people/freya", "person", "objects/", "pages/"),
            "objects/people/freya.md"
        );
        assert_eq!(object_id_to_file_path("my-note", "page", "objects/", ""), "objects/my-note.md");
        assert_eq!(object_id_to_file_path("my-note", "page", "", ""), "my-note.md");
        assert_eq!(
            object_id_to_file_path("objects/people/freya", "person", "objects", "pages"),
            "objects/people/freya.md"
        );
        assert_eq!(object_id_to_file_path("note.md", "page", "", ""), "note.md");
    }

    #[test]
    fn candidate_paths_are_literal_first_and_deduplicated() {
        assert_eq!(
            candidate_file_paths("people/freya", "objects/", "pages/"),
            vec!["people/freya.md", "objects/people/freya.md", "pages/people/freya.md"]
        );
        assert_eq!(
            candidate_file_paths("objects/people/freya.md", "objects/", "pages/"),
            vec!["objects/people/freya.md", "pages/objects/people/freya.md"]
        );
        assert_eq!(candidate_file_paths("x", "same/", "same/"), vec!["x.md", "same/x.md"]);
        assert_eq!(candidate_file_paths("x", "", ""), vec!["x.md"]);
    }

    #[test]
    fn round_trip_through_file_path() {
        let roots = [("objects/", "pages/"), ("objects/", ""), ("", "pages/"), ("", "")];
        let ids = ["people/freya", "my-note", "deep/nested/item", "2026-01-15"];
        for (objects_root, pages_root) in roots {
            for type_name in ["", "page", "person"] {
                for id in ids {
                    let path = object_id_to_file_path(id, type_name, objects_root, pages_root);
                    assert_eq!(
                        file_path_to_object_id(&path, objects_root, pages_root),
                        id,
                        "roots ({objects_root:?}, {pages_root:?}) type {type_name:?}"
                    );
                }
            }
        }
    }
}
