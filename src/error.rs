use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorConfigError {
    #[error("Failed to decode {name} as UTF-8: {source}")]
    Decode {
        name: String,
        source: std::str::Utf8Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Options error: {0}")]
    Options(#[from] confique::Error),

    #[error("Target path {0} has no parent directory")]
    InvalidTarget(PathBuf),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a section selector could not be compiled.
///
/// Never surfaced to callers of the resolution entry points: a selector that
/// fails to compile simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Empty selector")]
    Empty,

    #[error("Selector is {len} characters long (limit {limit})")]
    TooLong { len: usize, limit: usize },

    #[error("Unclosed '{open}' at offset {offset}")]
    Unclosed { open: char, offset: usize },
}
