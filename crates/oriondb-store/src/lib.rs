//! Binary archive storage, in-memory indexes, and ingest orchestration.
//!
//! ```
//! use oriondb_store::{Ingestor, IngestConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let mut ingestor = Ingestor::new(dir.path().join("games.oriondb"), IngestConfig::default())?;
//! ingestor.ingest_str("[Event \"Demo\"]\n1. e4 e5 *")?;
//! let indexes = ingestor.finish()?;
//! assert_eq!(indexes.metadata.game_offset.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod sidecar;

pub use archive::{ArchivedGame, ArchiveReader, ArchiveWriter};
pub use builder::Ingestor;
pub use config::IngestConfig;
pub use error::{ArchiveError, ConfigError, IngestError};
pub use index::IndexSet;
pub use model::GamePosition;
