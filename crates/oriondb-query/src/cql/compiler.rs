//! Compiles a parsed [`Expr`] tree into a [`CompiledQuery`], resolving
//! field names and operators against the builder's predicate slots.
//!
//! A pure conjunction of comparisons compiles to a single [`Query`]
//! (`CompiledQuery::Leaf`). `OR` cannot be folded into one `Query` (the
//! builder only models a conjunction), so it is kept as a tree and
//! evaluated by computing each branch's game-id set independently and
//! combining them with set union/intersection — the documented supported
//! subset from the query language's design.

use std::collections::HashSet;

use oriondb_core::{PawnStructure, TacticalMotif};
use oriondb_store::{ArchivedGame, ArchiveReader, IndexSet};

use crate::builder::{self, Query};
use crate::cql::ast::{Expr, Value};
use crate::cql::lexer::CmpOp;
use crate::error::CqlError;

#[derive(Debug, Clone)]
pub enum CompiledQuery {
    Leaf(Query),
    And(Box<CompiledQuery>, Box<CompiledQuery>),
    Or(Box<CompiledQuery>, Box<CompiledQuery>),
}

/// Clamps an Elo bound to `u32`'s range instead of wrapping, so `elo < 0`
/// yields an empty range rather than `n - 1` underflowing to `u32::MAX`.
fn clamp_elo(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

fn parse_pawn_structure(raw: &str) -> Result<PawnStructure, CqlError> {
    let normalized: String = raw.chars().filter(|c| *c != '_').collect();
    use PawnStructure::*;
    match normalized.to_lowercase().as_str() {
        "iqp" => Ok(Iqp),
        "carlsbad" => Ok(Carlsbad),
        "maroczybind" => Ok(MaroczyBind),
        "hangingpawns" => Ok(HangingPawns),
        "pawnchain" => Ok(PawnChain),
        "doubledpawns" => Ok(DoubledPawns),
        "passedpawn" => Ok(PassedPawn),
        "backwardpawn" => Ok(BackwardPawn),
        "none" => Ok(None),
        _ => Err(CqlError::UnknownPawnStructure(raw.to_string())),
    }
}

fn parse_tactical_motif(raw: &str) -> Result<TacticalMotif, CqlError> {
    let normalized: String = raw.chars().filter(|c| *c != '_').collect();
    use TacticalMotif::*;
    match normalized.to_lowercase().as_str() {
        "pin" => Ok(Pin),
        "fork" => Ok(Fork),
        "skewer" => Ok(Skewer),
        "discoveredattack" => Ok(DiscoveredAttack),
        "doubleattack" => Ok(DoubleAttack),
        "sacrifice" => Ok(Sacrifice),
        "deflection" => Ok(Deflection),
        "decoy" => Ok(Decoy),
        "removalofdefender" => Ok(RemovalOfDefender),
        "interference" => Ok(Interference),
        "overloading" => Ok(Overloading),
        "zugzwang" => Ok(Zugzwang),
        _ => Err(CqlError::UnknownTacticalMotif(raw.to_string())),
    }
}

fn expect_str(field: &str, value: &Value) -> Result<String, CqlError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Num(_) => Err(CqlError::ExpectedString(field.to_string())),
    }
}

fn expect_num(field: &str, value: &Value) -> Result<i64, CqlError> {
    match value {
        Value::Num(n) => Ok(*n),
        Value::Str(_) => Err(CqlError::ExpectedNumber(field.to_string())),
    }
}

fn invalid_op(field: &str, op: CmpOp) -> CqlError {
    CqlError::InvalidOperator {
        field: field.to_string(),
        op: format!("{op:?}"),
    }
}

/// Compiles a single `field OP value` comparison into a one-predicate
/// [`Query`].
fn compile_comparison(field: &str, op: CmpOp, value: &Value) -> Result<Query, CqlError> {
    let lowered = field.to_lowercase();
    let mut query = Query::default();

    match lowered.as_str() {
        "player" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.player = Some(expect_str(field, value)?);
        }
        "event" => {
            if !matches!(op, CmpOp::Eq | CmpOp::Contains) {
                return Err(invalid_op(field, op));
            }
            // CONTAINS on `event` resolves through the same tokenized
            // commentary search as CONTAINS on `commentary` — the field
            // mapping routes both through the comment index.
            if op == CmpOp::Contains {
                query.commentary = Some(expect_str(field, value)?);
            } else {
                query.event = Some(expect_str(field, value)?);
            }
        }
        "eco" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.eco = Some(expect_str(field, value)?);
        }
        "result" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.result = Some(expect_str(field, value)?);
        }
        "date" => match op {
            CmpOp::Eq => {
                let date = expect_str(field, value)?;
                query.start_date = Some(date.clone());
                query.end_date = Some(date);
            }
            CmpOp::Ge => query.start_date = Some(expect_str(field, value)?),
            CmpOp::Le => query.end_date = Some(expect_str(field, value)?),
            _ => return Err(invalid_op(field, op)),
        },
        "elo" => {
            let n = expect_num(field, value)?;
            match op {
                CmpOp::Eq => {
                    query.min_elo = Some(clamp_elo(n));
                    query.max_elo = Some(clamp_elo(n));
                }
                CmpOp::Gt => query.min_elo = Some(clamp_elo(n.saturating_add(1))),
                CmpOp::Ge => query.min_elo = Some(clamp_elo(n)),
                CmpOp::Lt => query.max_elo = Some(clamp_elo(n.saturating_sub(1))),
                CmpOp::Le => query.max_elo = Some(clamp_elo(n)),
                _ => return Err(invalid_op(field, op)),
            }
        }
        "fen" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.fen = Some(expect_str(field, value)?);
        }
        "structure" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.pawn_structure = Some(parse_pawn_structure(&expect_str(field, value)?)?);
        }
        "commentary" => {
            if !matches!(op, CmpOp::Eq | CmpOp::Contains) {
                return Err(invalid_op(field, op));
            }
            query.commentary = Some(expect_str(field, value)?);
        }
        "move" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.san_move = Some(expect_str(field, value)?);
        }
        "motif" => {
            if op != CmpOp::Eq {
                return Err(invalid_op(field, op));
            }
            query.motif = Some(parse_tactical_motif(&expect_str(field, value)?)?);
        }
        _ => return Err(CqlError::UnknownField(field.to_string())),
    }

    Ok(query)
}

fn compile_expr(expr: &Expr) -> Result<CompiledQuery, CqlError> {
    match expr {
        Expr::Comparison { field, op, value } => {
            Ok(CompiledQuery::Leaf(compile_comparison(field, *op, value)?))
        }
        Expr::And(left, right) => Ok(CompiledQuery::And(
            Box::new(compile_expr(left)?),
            Box::new(compile_expr(right)?),
        )),
        Expr::Or(left, right) => Ok(CompiledQuery::Or(
            Box::new(compile_expr(left)?),
            Box::new(compile_expr(right)?),
        )),
    }
}

/// Lexes, parses, and compiles CQL source into a [`CompiledQuery`].
pub fn compile(source: &str) -> Result<CompiledQuery, CqlError> {
    let expr = crate::cql::parser::parse(source)?;
    compile_expr(&expr)
}

pub fn matching_game_ids(compiled: &CompiledQuery, indexes: &IndexSet) -> HashSet<u32> {
    match compiled {
        CompiledQuery::Leaf(query) => builder::matching_game_ids(query, indexes),
        CompiledQuery::And(left, right) => {
            let left_ids = matching_game_ids(left, indexes);
            let right_ids = matching_game_ids(right, indexes);
            left_ids.intersection(&right_ids).copied().collect()
        }
        CompiledQuery::Or(left, right) => {
            let mut ids = matching_game_ids(left, indexes);
            ids.extend(matching_game_ids(right, indexes));
            ids
        }
    }
}

pub fn count(compiled: &CompiledQuery, indexes: &IndexSet) -> usize {
    matching_game_ids(compiled, indexes).len()
}

pub fn execute(compiled: &CompiledQuery, archive: &ArchiveReader, indexes: &IndexSet) -> Vec<ArchivedGame> {
    let mut ids: Vec<u32> = matching_game_ids(compiled, indexes).into_iter().collect();
    ids.sort_unstable();

    let mut games = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(&offset) = indexes.metadata.game_offset.get(&id) else {
            tracing::warn!(game_id = id, "matched game id has no archive offset, skipping");
            continue;
        };
        match archive.read_game_at(offset) {
            Ok(game) => games.push(game),
            Err(err) => {
                tracing::warn!(game_id = id, %err, "failed to read matched game, skipping");
            }
        }
    }
    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use oriondb_store::{IngestConfig, Ingestor};

    fn build_sample(pgn: &str) -> (tempfile::TempDir, ArchiveReader, IndexSet) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.oriondb");
        let mut ingestor = Ingestor::new(&path, IngestConfig::default()).unwrap();
        ingestor.ingest_str(pgn).unwrap();
        let indexes = ingestor.finish().unwrap();
        let reader = ArchiveReader::open(&path).unwrap();
        (dir, reader, indexes)
    }

    #[test]
    fn unknown_field_is_a_compile_error() {
        assert!(matches!(compile("nonsense = 1"), Err(CqlError::UnknownField(_))));
    }

    #[test]
    fn unsupported_operator_on_known_field_is_a_compile_error() {
        assert!(matches!(
            compile("player > 'x'"),
            Err(CqlError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn elo_range_conjunction_matches_builder_semantics() {
        let pgn = concat!(
            "[Event \"A\"]\n[WhiteElo \"2750\"]\n1. e4 *\n\n",
            "[Event \"B\"]\n[WhiteElo \"2680\"]\n1. d4 *\n",
        );
        let (_dir, _archive, indexes) = build_sample(pgn);
        let compiled = compile("elo > 2700 AND elo < 2800").unwrap();
        assert_eq!(count(&compiled, &indexes), 1);
    }

    #[test]
    fn elo_less_than_zero_clamps_instead_of_underflowing() {
        let pgn = concat!(
            "[Event \"A\"]\n[WhiteElo \"0\"]\n1. e4 *\n\n",
            "[Event \"B\"]\n[WhiteElo \"2680\"]\n1. d4 *\n",
        );
        let (_dir, _archive, indexes) = build_sample(pgn);
        let compiled = compile("elo < 0").unwrap();
        assert_eq!(count(&compiled, &indexes), 1);
    }

    #[test]
    fn or_unions_both_branches() {
        let pgn = concat!(
            "[Event \"A\"]\n[White \"Carlsen\"]\n1. e4 *\n\n",
            "[Event \"B\"]\n[White \"Kasparov\"]\n1. d4 *\n\n",
            "[Event \"C\"]\n[White \"Nobody\"]\n1. c4 *\n",
        );
        let (_dir, _archive, indexes) = build_sample(pgn);
        let compiled = compile("player = 'Carlsen' OR player = 'Kasparov'").unwrap();
        assert_eq!(count(&compiled, &indexes), 2);
    }

    #[test]
    fn cql_and_builder_agree_for_a_string_field() {
        let pgn = "[Event \"Test\"]\n[ECO \"B90\"]\n1. e4 c5 *";
        let (_dir, archive, indexes) = build_sample(pgn);

        let via_cql = execute(&compile("eco = 'B90'").unwrap(), &archive, &indexes);
        let via_builder = builder::execute(
            &crate::builder::QueryBuilder::new().eco("B90").build(),
            &archive,
            &indexes,
        );
        assert_eq!(via_cql, via_builder);
        assert_eq!(via_cql.len(), 1);
    }
}
