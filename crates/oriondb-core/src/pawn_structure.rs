//! Pawn-structure classification.

use std::collections::HashSet;

use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::{File, Rank, Square};

/// A recognized pawn-structure motif. Only
/// [`PawnStructure::Iqp`], [`PawnStructure::MaroczyBind`],
/// [`PawnStructure::DoubledPawns`], [`PawnStructure::PassedPawn`], and
/// [`PawnStructure::HangingPawns`] have detectors implemented today; the
/// rest are reserved variants kept for forward-compatible sidecars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PawnStructure {
    Iqp,
    Carlsbad,
    MaroczyBind,
    HangingPawns,
    PawnChain,
    DoubledPawns,
    PassedPawn,
    BackwardPawn,
    None,
}

/// A color's 4th rank index: white's is rank index 3 (rank 4), black's
/// mirrored equivalent is rank index 4 (rank 5).
fn fourth_rank(color: Color) -> u8 {
    match color {
        Color::White => 3,
        Color::Black => 4,
    }
}

fn pawns_of(pos: &Position, color: Color) -> Vec<Square> {
    pos.occupied()
        .filter(|(_, p)| p.kind() == Some(PieceType::Pawn) && p.color() == Some(color))
        .map(|(sq, _)| sq)
        .collect()
}

fn has_pawn_on_file(pawns: &[Square], file: u8) -> bool {
    pawns.iter().any(|sq| sq.file().index() == file)
}

fn detect_iqp(pos: &Position, color: Color) -> bool {
    let pawns = pawns_of(pos, color);
    let target_rank = fourth_rank(color);
    let on_d_fourth = pawns
        .iter()
        .any(|sq| sq.file().index() == File::D.index() && sq.rank().index() == target_rank);
    on_d_fourth && !has_pawn_on_file(&pawns, File::C.index()) && !has_pawn_on_file(&pawns, File::E.index())
}

fn detect_maroczy_bind(pos: &Position, color: Color) -> bool {
    let pawns = pawns_of(pos, color);
    let target_rank = fourth_rank(color);
    let on = |file: u8| {
        pawns
            .iter()
            .any(|sq| sq.file().index() == file && sq.rank().index() == target_rank)
    };
    on(File::C.index()) && on(File::E.index())
}

fn detect_doubled_pawns(pos: &Position, color: Color) -> bool {
    let pawns = pawns_of(pos, color);
    File::ALL.iter().any(|file| {
        pawns.iter().filter(|sq| sq.file() == *file).count() >= 2
    })
}

fn detect_passed_pawn(pos: &Position, color: Color) -> bool {
    let pawns = pawns_of(pos, color);
    let enemy_pawns = pawns_of(pos, color.opposite());
    pawns.iter().any(|&sq| {
        let file = sq.file().index() as i32;
        let rank = sq.rank().index() as i32;
        !enemy_pawns.iter().any(|&e| {
            let ef = e.file().index() as i32;
            let er = e.rank().index() as i32;
            (ef - file).abs() <= 1
                && match color {
                    Color::White => er > rank,
                    Color::Black => er < rank,
                }
        })
    })
}

fn detect_hanging_pawns(pos: &Position, color: Color) -> bool {
    let pawns = pawns_of(pos, color);
    let target_rank = fourth_rank(color);
    let behind_rank = target_rank as i32 - color.pawn_direction() as i32;

    for file in 0..7u8 {
        let has_duo = pawns
            .iter()
            .any(|sq| sq.file().index() == file && sq.rank().index() == target_rank)
            && pawns
                .iter()
                .any(|sq| sq.file().index() == file + 1 && sq.rank().index() == target_rank);
        if !has_duo {
            continue;
        }
        let flank_supported = [file as i32 - 1, file as i32 + 2].into_iter().any(|flank_file| {
            (0..8).contains(&flank_file)
                && (0..8).contains(&behind_rank)
                && pawns.iter().any(|sq| {
                    sq.file().index() == flank_file as u8 && sq.rank().index() == behind_rank as u8
                })
        });
        if !flank_supported {
            return true;
        }
    }
    false
}

/// Classifies all recognized pawn-structure motifs present in `pos`.
/// Returns `{PawnStructure::None}` when nothing is detected.
#[must_use]
pub fn classify(pos: &Position) -> HashSet<PawnStructure> {
    let mut tags = HashSet::new();
    for color in [Color::White, Color::Black] {
        if detect_iqp(pos, color) {
            tags.insert(PawnStructure::Iqp);
        }
        if detect_maroczy_bind(pos, color) {
            tags.insert(PawnStructure::MaroczyBind);
        }
        if detect_doubled_pawns(pos, color) {
            tags.insert(PawnStructure::DoubledPawns);
        }
        if detect_passed_pawn(pos, color) {
            tags.insert(PawnStructure::PassedPawn);
        }
        if detect_hanging_pawns(pos, color) {
            tags.insert(PawnStructure::HangingPawns);
        }
    }
    if tags.is_empty() {
        tags.insert(PawnStructure::None);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    #[test]
    fn startpos_has_no_structure_tags() {
        let tags = classify(&Position::startpos());
        assert_eq!(tags, HashSet::from([PawnStructure::None]));
    }

    #[test]
    fn detects_isolated_queens_pawn() {
        let pos = fen::parse("4k3/pp3ppp/8/8/3P4/8/PP3PPP/4K3 w - - 0 1").unwrap();
        assert!(classify(&pos).contains(&PawnStructure::Iqp));
    }

    #[test]
    fn detects_doubled_pawns() {
        let pos = fen::parse("4k3/8/8/8/4P3/4P3/8/4K3 w - - 0 1").unwrap();
        assert!(classify(&pos).contains(&PawnStructure::DoubledPawns));
    }

    #[test]
    fn detects_maroczy_bind() {
        let pos = fen::parse("4k3/8/8/8/2P1P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(classify(&pos).contains(&PawnStructure::MaroczyBind));
    }

    #[test]
    fn detects_passed_pawn() {
        let pos = fen::parse("4k3/8/8/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(classify(&pos).contains(&PawnStructure::PassedPawn));
    }

    #[test]
    fn blocked_pawn_is_not_passed() {
        let pos = fen::parse("4k3/4p3/8/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(!classify(&pos).contains(&PawnStructure::PassedPawn));
    }
}
