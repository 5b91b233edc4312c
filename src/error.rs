use std::path::PathBuf;

use thiserror::Error;

/// The page address is not an activity page. Display is the localized user message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GateError {
    pub message: String,
    pub location: String,
}

/// Failure of the execution host to produce a page snapshot.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read page snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("page returned HTTP {status}")]
    Status { status: u16 },
}

/// The one-shot full extraction failed. Always surfaced to the user.
#[derive(Debug, Error)]
#[error("{prefix}: {source}")]
pub struct ExtractionError {
    pub prefix: String,
    #[source]
    pub source: HostError,
}

/// Reasons a session could not reach its first record.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
