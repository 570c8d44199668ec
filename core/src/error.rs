use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading a corpus, fitting an index or reading a snapshot.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {path} (line {line}): {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("corpus is empty after deduplication")]
    EmptyCorpus,

    #[error("ticket id {0} appears more than once")]
    DuplicateTicketId(i64),

    #[error("vocabulary is empty: {0}")]
    EmptyVocabulary(&'static str),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("snapshot metadata is invalid: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io { path: path.into(), source }
    }
}

/// Rejected query parameters.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}
