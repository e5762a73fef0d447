//! Material signatures: piece counts and imbalance for a position.

use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Piece counts for both colors, excluding kings and pawns' color split
/// is tracked but kings are not (every legal position has exactly one
/// king per side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialSignature {
    pub white_queens: u8,
    pub white_rooks: u8,
    pub white_bishops: u8,
    pub white_knights: u8,
    pub white_pawns: u8,
    pub black_queens: u8,
    pub black_rooks: u8,
    pub black_bishops: u8,
    pub black_knights: u8,
    pub black_pawns: u8,
}

impl MaterialSignature {
    #[must_use]
    pub fn from_position(pos: &Position) -> Self {
        let mut sig = MaterialSignature::default();
        for (_, piece) in pos.occupied() {
            let (Some(kind), Some(color)) = (piece.kind(), piece.color()) else {
                continue;
            };
            let counter = match (kind, color) {
                (PieceType::Queen, Color::White) => &mut sig.white_queens,
                (PieceType::Rook, Color::White) => &mut sig.white_rooks,
                (PieceType::Bishop, Color::White) => &mut sig.white_bishops,
                (PieceType::Knight, Color::White) => &mut sig.white_knights,
                (PieceType::Pawn, Color::White) => &mut sig.white_pawns,
                (PieceType::Queen, Color::Black) => &mut sig.black_queens,
                (PieceType::Rook, Color::Black) => &mut sig.black_rooks,
                (PieceType::Bishop, Color::Black) => &mut sig.black_bishops,
                (PieceType::Knight, Color::Black) => &mut sig.black_knights,
                (PieceType::Pawn, Color::Black) => &mut sig.black_pawns,
                (PieceType::King, _) => continue,
            };
            *counter += 1;
        }
        sig
    }

    /// `Σ white_value − Σ black_value` using `{Q:9, R:5, B:3, N:3, P:1}`.
    #[must_use]
    pub fn imbalance(&self) -> i32 {
        let white = self.white_queens as i32 * 9
            + self.white_rooks as i32 * 5
            + self.white_bishops as i32 * 3
            + self.white_knights as i32 * 3
            + self.white_pawns as i32;
        let black = self.black_queens as i32 * 9
            + self.black_rooks as i32 * 5
            + self.black_bishops as i32 * 3
            + self.black_knights as i32 * 3
            + self.black_pawns as i32;
        white - black
    }

    /// True when total non-king pieces (both sides, pawns included) is
    /// at most 10.
    #[must_use]
    pub fn is_endgame(&self) -> bool {
        let total = self.white_queens
            + self.white_rooks
            + self.white_bishops
            + self.white_knights
            + self.white_pawns
            + self.black_queens
            + self.black_rooks
            + self.black_bishops
            + self.black_knights
            + self.black_pawns;
        total <= 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced_and_not_endgame() {
        let sig = MaterialSignature::from_position(&Position::startpos());
        assert_eq!(sig.imbalance(), 0);
        assert!(!sig.is_endgame());
        assert_eq!(sig.white_pawns, 8);
        assert_eq!(sig.black_queens, 1);
    }

    #[test]
    fn king_and_pawn_endgame_is_flagged() {
        let fen = "8/4k3/8/8/8/8/4P3/4K3 w - - 0 1";
        let pos = crate::fen::parse(fen).unwrap();
        let sig = MaterialSignature::from_position(&pos);
        assert!(sig.is_endgame());
        assert_eq!(sig.imbalance(), 1);
    }
}
