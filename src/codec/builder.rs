//! Object graph assembly: the heading hierarchy, object IDs, trait and reference binding, and
//! line spans.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    md::{Heading, RefOccurrence, TraitOccurrence},
    type_decl::TypeDeclaration,
};
use crate::{
    document::{ParsedObject, ParsedRef, ParsedTrait, SECTION_TYPE},
    paths::heading_slug,
    properties::{FieldMap, FieldValue},
};

/// Hands out the local part of heading-derived object IDs.
///
/// The first heading with a given base slug gets the base itself; the Nth gets `base-N`. A
/// candidate that is already taken (say a literal "Notes 2" heading after two "Notes") keeps
/// counting up, so derived IDs never collide with each other or with explicit IDs.
#[derive(Debug, Default)]
pub struct SlugAssigner {
    occurrences: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugAssigner {
    pub fn new() -> SlugAssigner {
        SlugAssigner::default()
    }

    /// Reserve `slug` verbatim. Returns false if it was already in use.
    pub fn claim_explicit(&mut self, slug: &str) -> bool {
        self.used.insert(slug.to_string())
    }

    pub fn assign(&mut self, base: &str) -> String {
        let count = self.occurrences.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let candidate = if *count == 1 {
                base.to_string()
            } else {
                format!("{base}-{count}")
            };
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Root object followed by one object per heading, in document order.
///
/// Parents come from a stack of `(id, level)` seeded with the root at level 0: each heading pops
/// entries at its own level or deeper, and the entry left on top is its parent.
#[tracing::instrument(skip_all, fields(file_id = %root.id, headings = headings.len()))]
pub fn build_objects(
    root: ParsedObject,
    headings: &[Heading],
    type_decls: &BTreeMap<usize, TypeDeclaration>,
) -> Vec<ParsedObject> {
    let file_id = root.id.clone();
    let mut objects = Vec::with_capacity(headings.len() + 1);
    objects.push(root);

    let mut slugs = SlugAssigner::new();
    let mut stack: Vec<(String, u8)> = vec![(file_id.clone(), 0)];

    for heading in headings {
        while stack.len() > 1 && stack.last().is_some_and(|(_, level)| *level >= heading.level) {
            stack.pop();
        }
        let parent_id = stack.last().map_or_else(|| file_id.clone(), |(id, _)| id.clone());

        let (slug, object_type, fields) = match type_decls.get(&heading.line) {
            Some(decl) => {
                let slug = match decl.id.as_deref() {
                    Some(explicit) => {
                        if !slugs.claim_explicit(explicit) {
                            tracing::warn!(
                                "line {}: explicit id '{}' is already used in {}",
                                heading.line,
                                explicit,
                                file_id
                            );
                        }
                        explicit.to_string()
                    }
                    None => {
                        let base = heading_slug(&heading.text);
                        let base = if base.is_empty() { decl.type_name.clone() } else { base };
                        slugs.assign(&base)
                    }
                };
                (slug, decl.type_name.clone(), decl.fields.clone())
            }
            None => {
                let base = heading_slug(&heading.text);
                let base = if base.is_empty() { SECTION_TYPE.to_string() } else { base };
                (slugs.assign(&base), SECTION_TYPE.to_string(), section_fields(heading))
            }
        };

        let id = format!("{file_id}#{slug}");
        stack.push((id.clone(), heading.level));
        objects.push(ParsedObject {
            id,
            object_type,
            fields,
            heading_text: Some(heading.text.clone()),
            heading_level: Some(heading.level),
            parent_id: Some(parent_id),
            line_start: heading.line,
            line_end: None,
        });
    }
    objects
}

fn section_fields(heading: &Heading) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("title".to_string(), FieldValue::String(heading.text.clone()));
    fields.insert("level".to_string(), FieldValue::Number(f64::from(heading.level)));
    fields
}

/// ID of the object with the greatest `line_start <= line`.
///
/// On equal starts the later object wins, since it is the more specific one. Lines before every
/// object fall back to the root. Works on any ordering of `objects`: sorted input is binary
/// searched, anything else is scanned.
pub fn find_parent_for_line(objects: &[ParsedObject], line: usize) -> Option<&str> {
    let sorted = objects.windows(2).all(|w| w[0].line_start <= w[1].line_start);
    let found = if sorted {
        let idx = objects.partition_point(|obj| obj.line_start <= line);
        idx.checked_sub(1).and_then(|idx| objects.get(idx))
    } else {
        objects
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.line_start <= line)
            .max_by_key(|(idx, obj)| (obj.line_start, *idx))
            .map(|(_, obj)| obj)
    };
    found
        .or_else(|| objects.iter().find(|obj| obj.is_root()))
        .or_else(|| objects.first())
        .map(|obj| obj.id.as_str())
}

pub fn bind_traits(objects: &[ParsedObject], traits: Vec<TraitOccurrence>) -> Vec<ParsedTrait> {
    traits
        .into_iter()
        .filter_map(|found| {
            let parent = find_parent_for_line(objects, found.line)?;
            Some(ParsedTrait {
                trait_name: found.name,
                value: found.value,
                content: found.content,
                parent_object_id: parent.to_string(),
                line: found.line,
            })
        })
        .collect()
}

pub fn bind_refs(objects: &[ParsedObject], refs: Vec<RefOccurrence>) -> Vec<ParsedRef> {
    refs.into_iter()
        .filter_map(|found| {
            let source = find_parent_for_line(objects, found.line)?;
            Some(into_parsed_ref(found, source))
        })
        .collect()
}

pub fn into_parsed_ref(found: RefOccurrence, source_id: &str) -> ParsedRef {
    ParsedRef {
        source_id: source_id.to_string(),
        target_raw: found.target,
        display_text: found.display_text,
        line: found.line,
        start: found.start,
        end: found.end,
    }
}

/// Set each object's inclusive `line_end` to one before the next object's start, leaving the
/// last object open-ended. Objects keep their order in the slice; the computation is over a
/// stable sort by `line_start`, so re-running it gives the same result.
pub fn compute_line_ends(objects: &mut [ParsedObject]) {
    let mut order = (0..objects.len()).collect::<Vec<_>>();
    order.sort_by_key(|idx| objects[*idx].line_start);

    for pair in order.windows(2) {
        let next_start = objects[pair[1]].line_start;
        objects[pair[0]].line_end = Some(next_start.saturating_sub(1));
    }
    if let Some(last) = order.last() {
        objects[*last].line_end = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::type_decl::parse_type_declaration;
    use test_log::test;

    fn root(id: &str) -> ParsedObject {
        ParsedObject {
            id: id.to_string(),
            object_type: "page".to_string(),
            fields: FieldMap::new(),
            heading_text: None,
            heading_level: None,
            parent_id: None,
            line_start: 1,
            line_end: None,
        }
    }

    fn heading(text: &str, level: u8, line: usize) -> Heading {
        Heading {
            text: text.to_string(),
            level,
            line,
        }
    }

    fn ids(objects: &[ParsedObject]) -> Vec<&str> {
        objects.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn duplicate_headings_are_numbered() {
        let headings = vec![heading("Notes", 2, 3), heading("Notes", 2, 5), heading("Notes", 2, 7)];
        let objects = build_objects(root("doc"), &headings, &BTreeMap::new());
        assert_eq!(ids(&objects), vec!["doc", "doc#notes", "doc#notes-2", "doc#notes-3"]);
        assert!(objects[1..].iter().all(|o| o.parent_id.as_deref() == Some("doc")));
    }

    #[test]
    fn adversarial_slug_collisions_stay_unique() {
        let headings = vec![
            heading("Notes", 2, 2),
            heading("Notes 2", 2, 3),
            heading("Notes", 2, 4),
            heading("!!!", 2, 5),
            heading("Section", 2, 6),
        ];
        let objects = build_objects(root("doc"), &headings, &BTreeMap::new());
        assert_eq!(
            ids(&objects),
            vec!["doc", "doc#notes", "doc#notes-2", "doc#notes-3", "doc#section", "doc#section-2"]
        );
    }

    #[test]
    fn parents_follow_heading_levels() {
        let headings = vec![
            heading("A", 1, 2),
            heading("B", 2, 3),
            heading("C", 4, 4),
            heading("D", 3, 5),
            heading("E", 2, 6),
            heading("F", 1, 7),
        ];
        let objects = build_objects(root("doc"), &headings, &BTreeMap::new());
        let parents = objects.iter().map(|o| o.parent_id.as_deref()).collect::<Vec<_>>();
        assert_eq!(
            parents,
            vec![None, Some("doc"), Some("doc#a"), Some("doc#b"), Some("doc#b"), Some("doc#a"), Some("doc")]
        );
    }

    #[test]
    fn sections_get_title_and_level_fields() {
        let objects = build_objects(root("doc"), &[heading("Plan", 3, 2)], &BTreeMap::new());
        assert_eq!(objects[1].object_type, SECTION_TYPE);
        assert_eq!(objects[1].fields["title"], FieldValue::from("Plan"));
        assert_eq!(objects[1].fields["level"], FieldValue::Number(3.0));
    }

    #[test]
    fn embedded_objects_use_declaration() {
        let mut decls = BTreeMap::new();
        decls.insert(2, parse_type_declaration("::meeting(time=09:00)", 3).unwrap());
        decls.insert(5, parse_type_declaration("::meeting(id=weekly)", 6).unwrap());
        decls.insert(8, parse_type_declaration("::meeting", 9).unwrap());
        let headings = vec![heading("Standup", 2, 2), heading("Standup", 2, 5), heading("***", 2, 8)];
        let objects = build_objects(root("doc"), &headings, &decls);
        assert_eq!(ids(&objects), vec!["doc", "doc#standup", "doc#weekly", "doc#meeting"]);
        assert_eq!(objects[1].object_type, "meeting");
        assert_eq!(objects[1].fields["time"], FieldValue::from("09:00"));
        assert_eq!(objects[3].object_type, "meeting");
    }

    #[test]
    fn explicit_ids_reserve_their_slug() {
        let mut decls = BTreeMap::new();
        decls.insert(2, parse_type_declaration("::task(id=notes)", 3).unwrap());
        let headings = vec![heading("Anything", 2, 2), heading("Notes", 2, 4)];
        let objects = build_objects(root("doc"), &headings, &decls);
        assert_eq!(ids(&objects), vec!["doc", "doc#notes", "doc#notes-2"]);
    }

    #[test]
    fn nearest_preceding_start_wins() {
        let mut objects = build_objects(
            root("doc"),
            &[heading("A", 1, 3), heading("B", 2, 6)],
            &BTreeMap::new(),
        );
        assert_eq!(find_parent_for_line(&objects, 1), Some("doc"));
        assert_eq!(find_parent_for_line(&objects, 3), Some("doc#a"));
        assert_eq!(find_parent_for_line(&objects, 5), Some("doc#a"));
        assert_eq!(find_parent_for_line(&objects, 100), Some("doc#b"));

        objects.reverse();
        assert_eq!(find_parent_for_line(&objects, 5), Some("doc#a"));
        assert_eq!(find_parent_for_line(&objects, 0), Some("doc"));
        assert_eq!(find_parent_for_line(&[], 1), None);
    }

    #[test]
    fn line_ends_are_idempotent() {
        let mut objects = build_objects(
            root("doc"),
            &[heading("A", 1, 3), heading("B", 2, 6)],
            &BTreeMap::new(),
        );
        compute_line_ends(&mut objects);
        let ends = objects.iter().map(|o| o.line_end).collect::<Vec<_>>();
        assert_eq!(ends, vec![Some(2), Some(5), None]);
        compute_line_ends(&mut objects);
        assert_eq!(objects.iter().map(|o| o.line_end).collect::<Vec<_>>(), ends);
    }
}
