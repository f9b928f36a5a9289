use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use serde_yaml::Error as YamlError;
use thiserror::Error;

/// The one structural failure a document parse can produce.
///
/// Everything else the parser meets is degraded to plain text or default values, so a caller
/// indexing a whole vault can record this per file and move on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ParseError {
    #[error("unterminated frontmatter: opening '---' on line {line} has no closing '---'")]
    UnterminatedFrontmatter { line: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum RavenError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Document parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for RavenError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => RavenError::NotFound(err.to_string()),
            _ => RavenError::Io(err.to_string()),
        }
    }
}

impl From<JsonError> for RavenError {
    fn from(err: JsonError) -> Self {
        RavenError::Serialization(err.to_string())
    }
}

impl From<YamlError> for RavenError {
    fn from(err: YamlError) -> Self {
        RavenError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for RavenError {
    fn from(err: toml::de::Error) -> Self {
        RavenError::Config(err.to_string())
    }
}
