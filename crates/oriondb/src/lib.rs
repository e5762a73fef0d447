//! `oriondb`: an embeddable, read-optimized chess game database.
//!
//! This crate is the single dependency an embedding application takes —
//! it re-exports the chess primitives, ingest configuration, and query
//! surface from `oriondb-core`/`oriondb-store`/`oriondb-query` behind one
//! `Database` handle.
//!
//! ```
//! use oriondb::{Database, IngestConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let pgn = "[Event \"Example\"][White \"A\"][Result \"1-0\"]\n1. e4 e5 1-0";
//! let db = Database::build(pgn, dir.path().join("games.oriondb"), IngestConfig::default())?;
//!
//! let games = db.execute(&db.query().player("a").build());
//! assert_eq!(games.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;

pub use database::Database;
pub use error::DatabaseError;

pub use oriondb_query::cql;
pub use oriondb_query::{count, execute, Query, QueryBuilder};

pub use oriondb_store::{ArchivedGame, ArchiveReader, ArchiveWriter, IngestConfig, Ingestor};

pub use oriondb_pgn::{Game, Move, ParseError as PgnParseError};

pub use oriondb_core::{
    apply, fen, pawn_structure, san, tactics, zobrist, ApplyError, CastleSide, Color, FenError, File,
    MaterialSignature, ParsedSan, PawnStructure, Piece, PieceType, Position, Rank, SanError, Square, TacticalMotif,
    ZOBRIST,
};
