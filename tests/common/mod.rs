//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub const FREYA: &str = "---\ntype: person\nname: Freya\n---\n# Freya\n\nWorks with [[people/thor]].\n";

pub const RAVEN: &str = "---
type: project
status: active
owner: \"[[people/freya]]\"
---
# Raven

## Standup
::meeting(time=09:00, attendees=[[[people/freya]], [[people/thor]]])
- @due(2026-01-15) ship it
- @priority(high) review [[people/thor|Thor]]'s notes

## Notes
Plain text with `@not-a-trait` and `[[not/a-ref]]` in code.

```
## Not a heading
@ignored [[ignored]]
```

## Notes
### Detail
@done
";

pub const MY_NOTE: &str = "Just a page pointing at [[projects/raven#standup|the standup]].\n";

pub const BROKEN: &str = "---\ntitle: never closed\n\n# Body\n";

/// Create a vault with a config file, two objects, a page, and one file whose frontmatter is
/// never closed.
///
/// Returns the path to the vault root (e.g. `<temp_dir>/vault/`).
#[allow(dead_code)]
pub fn create_test_vault(temp_dir: &TempDir) -> PathBuf {
    let vault = temp_dir.path().join("vault");
    std::fs::create_dir_all(vault.join("objects/people")).unwrap();
    std::fs::create_dir_all(vault.join("objects/projects")).unwrap();
    std::fs::create_dir_all(vault.join("pages")).unwrap();

    std::fs::write(
        vault.join("raven.yaml"),
        "directories:\n  object: objects/\n  page: pages/\n",
    )
    .unwrap();
    std::fs::write(vault.join("objects/people/freya.md"), FREYA).unwrap();
    std::fs::write(vault.join("objects/projects/raven.md"), RAVEN).unwrap();
    std::fs::write(vault.join("pages/my-note.md"), MY_NOTE).unwrap();
    std::fs::write(vault.join("pages/broken.md"), BROKEN).unwrap();

    vault
}

/// Lines of `text` without terminators, treating `\n`, `\r\n` and a bare `\r` alike.
#[allow(dead_code)]
pub fn source_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Every `.md` file under `dir`, sorted.
#[allow(dead_code)]
pub fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "md") {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}
