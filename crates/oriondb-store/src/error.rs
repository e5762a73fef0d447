//! Storage-layer errors: archive I/O/format errors are fatal to the
//! handle that raised them; config errors are raised before any I/O.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad magic bytes: expected \"ORDB\", found {0:?}")]
    BadMagic([u8; 4]),
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(u32),
    #[error("truncated record at byte offset {0}")]
    TruncatedRecord(u64),
    #[error("archive and sidecar are out of sync: {0}")]
    SidecarMismatch(String),
    #[error("stored string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("move indexing requires position indexing to be enabled")]
    MoveIndexingRequiresPositionIndexing,
    #[error("motif indexing requires position indexing to be enabled")]
    MotifIndexingRequiresPositionIndexing,
}

/// Errors an [`crate::builder::Ingestor`] can raise: a bad config is
/// caught before any file is touched, everything after that is an
/// archive I/O or format failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
