//! Tactical-motif detection over pseudo-legal attack sets.

use std::collections::HashSet;

use crate::attacks::{self, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::square::{File, Rank, Square};

/// A recognized tactical motif. Only [`TacticalMotif::Pin`],
/// [`TacticalMotif::Fork`], [`TacticalMotif::Skewer`], and
/// [`TacticalMotif::DoubleAttack`] have detectors implemented today; the
/// rest are reserved variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TacticalMotif {
    Pin,
    Fork,
    Skewer,
    DiscoveredAttack,
    DoubleAttack,
    Sacrifice,
    Deflection,
    Decoy,
    RemovalOfDefender,
    Interference,
    Overloading,
    Zugzwang,
}

fn slider_directions(kind: PieceType) -> &'static [(i32, i32)] {
    match kind {
        PieceType::Bishop => &BISHOP_DIRECTIONS,
        PieceType::Rook => &ROOK_DIRECTIONS,
        PieceType::Queen => &[
            (1, 0), (-1, 0), (0, 1), (0, -1),
            (1, 1), (1, -1), (-1, 1), (-1, -1),
        ],
        _ => &[],
    }
}

fn attacked_squares(pos: &Position, from: Square, piece: Piece) -> Vec<Square> {
    match piece.kind() {
        Some(PieceType::Pawn) => attacks::pawn_attacks(from, piece.color().unwrap()),
        Some(PieceType::Knight) => attacks::knight_attacks(from),
        Some(PieceType::King) => attacks::king_attacks(from),
        Some(kind) if kind.is_slider() => slider_directions(kind)
            .iter()
            .flat_map(|&dir| attacks::ray(pos, from, dir))
            .collect(),
        _ => Vec::new(),
    }
}

fn attacks_square(pos: &Position, from: Square, piece: Piece, target: Square) -> bool {
    attacked_squares(pos, from, piece).contains(&target)
}

fn attackers_of(pos: &Position, target: Square, attacker_color: Color) -> Vec<Square> {
    pos.occupied()
        .filter(|(sq, piece)| piece.color() == Some(attacker_color) && attacks_square(pos, *sq, *piece, target))
        .map(|(sq, _)| sq)
        .collect()
}

/// Walks a ray past any empty squares, collecting the first two occupied
/// squares it finds (unlike [`attacks::ray`], which stops at the first
/// blocker — pin/skewer detection needs to see the piece behind it too).
fn ray_first_two_pieces(pos: &Position, from: Square, dir: (i32, i32)) -> Vec<(Square, Piece)> {
    let mut found = Vec::new();
    let mut file = from.file().index() as i32 + dir.0;
    let mut rank = from.rank().index() as i32 + dir.1;
    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let sq = Square::new(File::from_index(file as u8).unwrap(), Rank::from_index(rank as u8).unwrap());
        let piece = pos.piece_at(sq);
        if !piece.is_none() {
            found.push((sq, piece));
            if found.len() == 2 {
                break;
            }
        }
        file += dir.0;
        rank += dir.1;
    }
    found
}

fn detect_pins_and_skewers(pos: &Position, tags: &mut HashSet<TacticalMotif>) {
    for (from, attacker) in pos.occupied() {
        let Some(kind) = attacker.kind() else { continue };
        if !kind.is_slider() {
            continue;
        }
        let attacker_color = attacker.color().unwrap();
        for &dir in slider_directions(kind) {
            let pieces = ray_first_two_pieces(pos, from, dir);
            if pieces.len() != 2 {
                continue;
            }
            let (_, front) = pieces[0];
            let (_, back) = pieces[1];
            if front.color() != Some(attacker_color.opposite()) || back.color() != Some(attacker_color.opposite()) {
                continue;
            }
            let front_value = front.kind().map(tactical_value).unwrap_or(0);
            let back_value = back.kind().map(tactical_value).unwrap_or(0);
            if front_value < back_value {
                tags.insert(TacticalMotif::Pin);
            } else if front_value > back_value && front_value >= 3 {
                tags.insert(TacticalMotif::Skewer);
            }
        }
    }
}

/// Piece value used by the pin/skewer/fork detectors. Differs from
/// [`PieceType::value`] (which values a king at 0 for material-imbalance
/// purposes) by treating the king as more valuable than anything else,
/// so an absolute pin or skewer against the king is recognized.
fn tactical_value(kind: PieceType) -> u32 {
    match kind {
        PieceType::King => 100,
        other => other.value(),
    }
}

fn detect_fork(pos: &Position, tags: &mut HashSet<TacticalMotif>) {
    for (from, piece) in pos.occupied() {
        let Some(kind) = piece.kind() else { continue };
        let own_value = tactical_value(kind);
        let color = piece.color().unwrap();
        let targets = attacked_squares(pos, from, piece);
        let hit_count = targets
            .iter()
            .filter(|&&sq| {
                let target = pos.piece_at(sq);
                target.color() == Some(color.opposite())
                    && target.kind().map(tactical_value).unwrap_or(0) >= own_value
            })
            .count();
        if hit_count >= 2 {
            tags.insert(TacticalMotif::Fork);
        }
    }
}

fn detect_double_attack(pos: &Position, tags: &mut HashSet<TacticalMotif>) {
    for (target_sq, target_piece) in pos.occupied() {
        let Some(color) = target_piece.color() else { continue };
        if attackers_of(pos, target_sq, color.opposite()).len() >= 2 {
            tags.insert(TacticalMotif::DoubleAttack);
        }
    }
}

/// Detects all recognized tactical motifs present in `pos`. Returns an
/// empty set when nothing is detected.
#[must_use]
pub fn detect(pos: &Position) -> HashSet<TacticalMotif> {
    let mut tags = HashSet::new();
    detect_pins_and_skewers(pos, &mut tags);
    detect_fork(pos, &mut tags);
    detect_double_attack(pos, &mut tags);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    #[test]
    fn startpos_has_no_motifs() {
        assert!(detect(&Position::startpos()).is_empty());
    }

    #[test]
    fn detects_fork_knight_forking_king_and_rook() {
        // White knight on c7 forks the black king on e8 and rook on a8.
        let pos = fen::parse("r3k3/2N5/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(detect(&pos).contains(&TacticalMotif::Fork));
    }

    #[test]
    fn detects_pin_against_king() {
        // White rook on e1, black king on e8, black knight pinned on e5.
        let pos = fen::parse("4k3/8/8/4n3/8/8/8/4R1K1 w - - 0 1").unwrap();
        assert!(detect(&pos).contains(&TacticalMotif::Pin));
    }

    #[test]
    fn detects_skewer_through_rook_to_lesser_piece() {
        // White rook on e1 skewers black rook on e5 with a black bishop
        // behind it on e8.
        let pos = fen::parse("4b3/8/8/4r3/8/8/8/4R1K1 w - - 0 1").unwrap();
        assert!(detect(&pos).contains(&TacticalMotif::Skewer));
    }

    #[test]
    fn detects_double_attack_on_a_single_square() {
        // Black knight on d5 is attacked by both a white knight on c3
        // and a white bishop on f3.
        let pos = fen::parse("4k3/8/8/3n4/8/2N2B2/8/4K3 w - - 0 1").unwrap();
        assert!(detect(&pos).contains(&TacticalMotif::DoubleAttack));
    }
}
