//! Facade-level errors: wraps the storage and query layers' errors
//! behind the single type a `Database` consumer sees.

use thiserror::Error;

use oriondb_query::CqlError;
use oriondb_store::{ArchiveError, IngestError};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Cql(#[from] CqlError),
}
