//! Fluent query builder, execution against an open archive + index set,
//! and the CQL query language that compiles to the same resolution path.
//!
//! ```
//! use oriondb_query::QueryBuilder;
//! use oriondb_store::{IngestConfig, Ingestor, ArchiveReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("games.oriondb");
//! let mut ingestor = Ingestor::new(&path, IngestConfig::default())?;
//! ingestor.ingest_str("[Event \"Demo\"][White \"A\"][Result \"1-0\"]\n1. e4 e5 1-0")?;
//! let indexes = ingestor.finish()?;
//! let archive = ArchiveReader::open(&path)?;
//!
//! let query = QueryBuilder::new().player("a").result("1-0").build();
//! let games = oriondb_query::execute(&query, &archive, &indexes);
//! assert_eq!(games.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cql;
pub mod error;

pub use builder::{count, execute, matching_game_ids, Query, QueryBuilder};
pub use error::CqlError;
