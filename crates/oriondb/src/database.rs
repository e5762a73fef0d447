//! `Database`: the archive + index-set pair consumers open and query.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use oriondb_query::cql::{self, CompiledQuery};
use oriondb_query::{Query, QueryBuilder};
use oriondb_store::{ArchiveReader, ArchivedGame, IndexSet, IngestConfig, Ingestor};

use crate::error::DatabaseError;

fn sidecar_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path.as_os_str().to_os_string();
    name.push(OsStr::new(".idx"));
    PathBuf::from(name)
}

/// A read-optimized chess game database: a binary archive plus the
/// in-memory indexes built over it at ingest time.
pub struct Database {
    archive: ArchiveReader,
    indexes: IndexSet,
}

impl Database {
    /// Ingests `pgn` into a fresh archive at `archive_path`, writes its
    /// sidecar alongside it, and returns a handle opened for querying.
    pub fn build(pgn: &str, archive_path: impl AsRef<Path>, config: IngestConfig) -> Result<Self, DatabaseError> {
        let archive_path = archive_path.as_ref();
        let mut ingestor = Ingestor::new(archive_path, config)?;
        ingestor.ingest_str(pgn)?;
        let indexes = ingestor.finish()?;
        oriondb_store::sidecar::save(&indexes, sidecar_path(archive_path))?;

        let archive = ArchiveReader::open(archive_path)?;
        Ok(Database { archive, indexes })
    }

    /// Opens a previously-built archive and its sidecar. A sidecar whose
    /// game count disagrees with the archive's is treated as corruption,
    /// never silently reconciled.
    pub fn open(archive_path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let archive_path = archive_path.as_ref();
        let archive = ArchiveReader::open(archive_path)?;
        let indexes = oriondb_store::sidecar::load(sidecar_path(archive_path))?;

        if indexes.metadata.game_offset.len() as u32 != archive.game_count {
            return Err(oriondb_store::ArchiveError::SidecarMismatch(format!(
                "archive has {} games, sidecar indexes {}",
                archive.game_count,
                indexes.metadata.game_offset.len()
            ))
            .into());
        }

        Ok(Database { archive, indexes })
    }

    /// Starts a fluent query against this database's predicate slots.
    #[must_use]
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Intersects `query`'s filters and reads back the matching games.
    #[must_use]
    pub fn execute(&self, query: &Query) -> Vec<ArchivedGame> {
        oriondb_query::execute(query, &self.archive, &self.indexes)
    }

    /// Intersects `query`'s filters without reading any game bodies.
    #[must_use]
    pub fn count(&self, query: &Query) -> usize {
        oriondb_query::count(query, &self.indexes)
    }

    /// Compiles `source` as CQL and executes it.
    pub fn execute_cql(&self, source: &str) -> Result<Vec<ArchivedGame>, DatabaseError> {
        let compiled = cql::compile(source)?;
        Ok(cql::execute(&compiled, &self.archive, &self.indexes))
    }

    /// Compiles `source` as CQL and counts its matches.
    pub fn count_cql(&self, source: &str) -> Result<usize, DatabaseError> {
        let compiled = cql::compile(source)?;
        Ok(cql::count(&compiled, &self.indexes))
    }

    /// Evaluates an already-compiled CQL expression, for callers that
    /// compiled it once and want to run it repeatedly.
    #[must_use]
    pub fn execute_compiled(&self, compiled: &CompiledQuery) -> Vec<ArchivedGame> {
        cql::execute(compiled, &self.archive, &self.indexes)
    }

    /// The index set backing this database, for callers that need direct
    /// access beyond the query surface (e.g. diagnostics, sidecar export).
    #[must_use]
    pub fn indexes(&self) -> &IndexSet {
        &self.indexes
    }

    #[must_use]
    pub fn game_count(&self) -> u32 {
        self.archive.game_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "[Event \"World Cup\"]\n[White \"Carlsen, Magnus\"]\n[Black \"Nepo\"]\n[Result \"1-0\"]\n",
        "1. e4 e5 1-0\n\n",
        "[Event \"World Cup\"]\n[White \"Nepo\"]\n[Black \"Carlsen, Magnus\"]\n[Result \"0-1\"]\n",
        "1. d4 d5 0-1\n",
    );

    #[test]
    fn build_then_query_by_player_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::build(SAMPLE, dir.path().join("games.oriondb"), IngestConfig::default()).unwrap();

        let query = db.query().player("carlsen, magnus").result("1-0").build();
        let games = db.execute(&query);
        assert_eq!(games.len(), 1);
        assert_eq!(db.count(&query), 1);
    }

    #[test]
    fn cql_and_builder_queries_agree() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::build(SAMPLE, dir.path().join("games.oriondb"), IngestConfig::default()).unwrap();

        let via_cql = db.execute_cql("player = 'carlsen, magnus' AND result = '1-0'").unwrap();
        let via_builder = db.execute(&db.query().player("carlsen, magnus").result("1-0").build());
        assert_eq!(via_cql, via_builder);
    }

    #[test]
    fn reopening_a_built_database_reproduces_the_same_queries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        Database::build(SAMPLE, &path, IngestConfig::default()).unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.game_count(), 2);
        assert_eq!(reopened.count(&reopened.query().result("0-1").build()), 1);
    }

    #[test]
    fn unknown_cql_field_surfaces_as_a_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::build(SAMPLE, dir.path().join("games.oriondb"), IngestConfig::default()).unwrap();
        assert!(db.execute_cql("nonsense = 1").is_err());
    }
}
