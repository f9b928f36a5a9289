use std::path::{Component, Path};

/// Convert an os path into a `/`-separated string, dropping root and `.` components.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    let os_path = os_path_ref.as_ref();
    let joined = os_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    tracing::trace!("os_path_to_string: {:?} -> {}", os_path, joined);
    joined
}

/// Normalize a directory root to no leading slash and exactly one trailing slash.
///
/// An empty (or all-slash) root means "no root" and normalizes to `""`.
///
/// ```
/// use raven_core::paths::normalize_dir_root;
/// assert_eq!(normalize_dir_root("/objects/"), "objects/");
/// assert_eq!(normalize_dir_root("objects"), "objects/");
/// assert_eq!(normalize_dir_root(""), "");
/// ```
pub fn normalize_dir_root(root: &str) -> String {
    let slashed = to_slash(root);
    let trimmed = slashed.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Normalize a vault-relative, path-like value: `/` separators, no leading `./` or `/`, and no
/// repeated separators.
pub fn normalize_rel_path(path: &str) -> String {
    let slashed = to_slash(path);
    let stripped = slashed.strip_prefix("./").unwrap_or(&slashed);
    let stripped = stripped.strip_prefix('/').unwrap_or(stripped);
    let mut normalized = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

/// Path of `file_path` relative to `vault_path`, `/`-separated.
///
/// When `vault_path` is empty or is not a prefix of `file_path`, the path is kept as given
/// (separators still normalized).
pub fn vault_relative_path(file_path: &str, vault_path: &str) -> String {
    if !vault_path.is_empty() {
        if let Ok(rel) = Path::new(file_path).strip_prefix(Path::new(vault_path)) {
            return os_path_to_string(rel);
        }
    }
    to_slash(file_path)
}

/// Derive the URL/ID-safe slug of a heading.
///
/// Letters are lowercased and alphanumerics kept; every run of other characters becomes a
/// single `-`, and leading/trailing hyphens are trimmed. The result may be empty.
///
/// ```
/// use raven_core::paths::heading_slug;
/// assert_eq!(heading_slug("Weekly Standup: Q1"), "weekly-standup-q1");
/// assert_eq!(heading_slug("  --- "), "");
/// ```
pub fn heading_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn to_slash(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
