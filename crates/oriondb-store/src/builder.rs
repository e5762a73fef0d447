//! Ingest orchestration: parses PGN, replays each game to build the
//! configured indexes, and appends every game to the archive.

use oriondb_core::{Position, apply, fen, material::MaterialSignature, pawn_structure, san, tactics, zobrist};
use oriondb_pgn::{Game, ParseError};

use crate::archive::ArchiveWriter;
use crate::config::IngestConfig;
use crate::error::{ArchiveError, IngestError};
use crate::index::IndexSet;
use crate::model::GamePosition;
use std::path::Path;

/// Drives one ingest run: every game handed to [`Ingestor::ingest_str`]
/// is appended to the archive and, per `config`, replayed to populate
/// the in-memory indexes returned by [`Ingestor::finish`].
pub struct Ingestor {
    writer: ArchiveWriter,
    config: IngestConfig,
    indexes: IndexSet,
}

impl Ingestor {
    pub fn new(archive_path: impl AsRef<Path>, config: IngestConfig) -> Result<Self, IngestError> {
        config.validate()?;
        let writer = ArchiveWriter::create(archive_path)?;
        Ok(Ingestor {
            writer,
            config,
            indexes: IndexSet::default(),
        })
    }

    /// Parses `pgn` and ingests every game found in it. Returns the
    /// non-fatal parse errors for any malformed games that were
    /// skipped; an `Err` here means the archive file itself failed.
    pub fn ingest_str(&mut self, pgn: &str) -> Result<Vec<ParseError>, ArchiveError> {
        let (games, errors) = oriondb_pgn::parse(pgn);
        for game in &games {
            self.ingest_game(game)?;
        }
        Ok(errors)
    }

    fn ingest_game(&mut self, game: &Game) -> Result<(), ArchiveError> {
        let offset = self.writer.write_game(game)?;
        self.indexes.metadata.record_offset(game.id, offset);
        self.index_metadata_tags(game);

        tracing::debug!(game_id = game.id, moves = game.moves.len(), "ingested game");

        if self.config.enable_position_indexing {
            self.replay_and_index(game);
        } else if self.config.enable_comment_indexing {
            self.index_comments_without_replay(game);
        }

        Ok(())
    }

    fn index_metadata_tags(&mut self, game: &Game) {
        let meta = &mut self.indexes.metadata;
        if let Some(white) = game.tag("White") {
            meta.record_player(game.id, white);
        }
        if let Some(black) = game.tag("Black") {
            meta.record_player(game.id, black);
        }
        if let Some(event) = game.tag("Event") {
            meta.record_event(game.id, event);
        }
        if let Some(eco) = game.tag("ECO") {
            meta.record_eco(game.id, eco);
        }
        if let Some(result) = game.tag("Result") {
            meta.record_result(game.id, result);
        }
        if let Some(date) = game.tag("Date") {
            meta.record_date(game.id, date);
        }
        for tag in ["WhiteElo", "BlackElo"] {
            if let Some(elo) = game.tag(tag).and_then(|v| v.parse::<u32>().ok()) {
                meta.record_elo(game.id, elo);
            }
        }
    }

    /// Walks the game from the starting position, halting at the first
    /// SAN token that fails to parse or apply (a malformed or illegal
    /// move downstream of whatever produced the PGN), and indexes every
    /// position reached along the way.
    fn replay_and_index(&mut self, game: &Game) {
        let mut pos = Position::startpos();
        self.index_position(game.id, 0, &pos);

        for (i, mv) in game.moves.iter().enumerate() {
            let ply = i as u32 + 1;
            let parsed = match san::parse(&mv.san) {
                Ok(parsed) => parsed,
                Err(err) => {
                    tracing::warn!(game_id = game.id, ply, %err, "halting replay: unparseable SAN");
                    return;
                }
            };
            pos = match apply::apply_move(&pos, &parsed) {
                Ok(next) => next,
                Err(err) => {
                    tracing::warn!(game_id = game.id, ply, %err, "halting replay: move could not be applied");
                    return;
                }
            };

            self.index_position(game.id, ply, &pos);

            if self.config.enable_move_indexing {
                let gp = GamePosition {
                    game_id: game.id,
                    ply,
                    fen: fen::to_fen(&pos),
                };
                self.indexes.moves.record(&mv.san, gp);
            }
            if self.config.enable_comment_indexing {
                if let Some(comment) = &mv.comment {
                    let gp = GamePosition {
                        game_id: game.id,
                        ply,
                        fen: fen::to_fen(&pos),
                    };
                    self.indexes.comments.record(comment, gp);
                }
            }
        }
    }

    fn index_position(&mut self, game_id: u32, ply: u32, pos: &Position) {
        let gp = GamePosition {
            game_id,
            ply,
            fen: fen::to_fen(pos),
        };

        let hash = zobrist::hash(pos);
        self.indexes.position.record(hash, gp.clone());

        let signature = MaterialSignature::from_position(pos);
        self.indexes.material.record(signature, signature.imbalance(), gp.clone());

        for structure in pawn_structure::classify(pos) {
            self.indexes.structure.record(structure, gp.clone());
        }

        if self.config.enable_motif_indexing {
            for motif in tactics::detect(pos) {
                self.indexes.motifs.record(motif, gp.clone());
            }
        }
    }

    /// Comment indexing is the one index that doesn't require replaying
    /// the game, so it can run even when position indexing is disabled
    /// — the resulting `GamePosition`s carry an empty `fen` since no
    /// board was ever reached to read one from.
    fn index_comments_without_replay(&mut self, game: &Game) {
        for (i, mv) in game.moves.iter().enumerate() {
            if let Some(comment) = &mv.comment {
                let gp = GamePosition {
                    game_id: game.id,
                    ply: i as u32 + 1,
                    fen: String::new(),
                };
                self.indexes.comments.record(comment, gp);
            }
        }
    }

    /// Finalizes the archive (backpatching its game count) and hands
    /// back every index built during this run.
    pub fn finish(self) -> Result<IndexSet, ArchiveError> {
        self.writer.finish()?;
        Ok(self.indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_a_game_and_populates_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        let mut ingestor = Ingestor::new(&path, IngestConfig::default()).unwrap();

        let pgn = "[Event \"Test\"]\n[White \"Alice\"]\n[Black \"Bob\"]\n[Result \"1-0\"]\n1. e4 {a good start} e5 2. Nf3 Nc6 1-0";
        let errors = ingestor.ingest_str(pgn).unwrap();
        assert!(errors.is_empty());

        let indexes = ingestor.finish().unwrap();
        assert!(indexes.metadata.player.contains_key("alice"));
        assert!(indexes.metadata.result.contains_key("1-0"));
        assert!(!indexes.position.by_hash.is_empty());
        assert!(!indexes.moves.by_san.is_empty());
        assert!(indexes.comments.by_token.contains_key("good"));
    }

    #[test]
    fn rejects_invalid_config_before_touching_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        let config = IngestConfig {
            enable_position_indexing: false,
            enable_move_indexing: true,
            ..IngestConfig::default()
        };
        assert!(Ingestor::new(&path, config).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn halts_replay_on_illegal_move_but_keeps_earlier_plies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        let mut ingestor = Ingestor::new(&path, IngestConfig::default()).unwrap();

        let pgn = "[Event \"Test\"]\n1. e4 Nd5 2. Nf3 *";
        ingestor.ingest_str(pgn).unwrap();
        let indexes = ingestor.finish().unwrap();

        let timeline = &indexes.moves.by_game[&0];
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].0, "e4");
    }
}
