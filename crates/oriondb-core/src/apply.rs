//! The board engine: resolves a [`ParsedSan`] against a [`Position`] and
//! applies it, producing the next position.
//!
//! Source-square resolution scans every square holding a piece of the
//! right type and color, filters by any disambiguators given in the SAN
//! token, then filters by a type-specific pseudo-legal reachability
//! predicate. No legal-move list is ever generated.

use thiserror::Error;

use crate::piece::{Color, Piece, PieceType};
use crate::position::{self, Position};
use crate::san::{CastleSide, ParsedSan};
use crate::square::{File, Rank, Square};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("no piece can reach the target square for this move")]
    NoMatchingPiece,
    #[error("more than one piece can reach the target square; move is ambiguous")]
    AmbiguousMove,
    #[error("castling rights unavailable for this side")]
    IllegalCastle,
}

/// Applies a parsed SAN descriptor to `pos`, returning the resulting
/// position or a resolution failure. Never panics on malformed input;
/// callers (the replay loop) treat an `Err` as a halt signal.
pub fn apply_move(pos: &Position, parsed: &ParsedSan) -> Result<Position, ApplyError> {
    if let Some(side) = parsed.castle_side {
        return apply_castle(pos, side);
    }

    let candidates = find_source_squares(pos, parsed);
    match candidates.len() {
        0 => Err(ApplyError::NoMatchingPiece),
        1 => Ok(apply_resolved(pos, candidates[0], parsed)),
        _ => Err(ApplyError::AmbiguousMove),
    }
}

fn find_source_squares(pos: &Position, parsed: &ParsedSan) -> Vec<Square> {
    let mut candidates = Vec::new();
    for index in 0..64u8 {
        let sq = Square::from_index(index).unwrap();
        let piece = pos.piece_at(sq);
        if piece.kind() != Some(parsed.piece_type) || piece.color() != Some(pos.side_to_move) {
            continue;
        }
        if let Some(file) = parsed.from_file {
            if sq.file().index() != file {
                continue;
            }
        }
        if let Some(rank) = parsed.from_rank {
            if sq.rank().index() != rank {
                continue;
            }
        }
        if reachable(pos, sq, parsed) {
            candidates.push(sq);
        }
    }
    candidates
}

fn reachable(pos: &Position, from: Square, parsed: &ParsedSan) -> bool {
    let to = parsed.to_square;
    match parsed.piece_type {
        PieceType::Pawn => pawn_reachable(pos, from, to, parsed.is_capture),
        PieceType::Knight => knight_reachable(from, to) && destination_ok(pos, to, parsed.is_capture),
        PieceType::King => king_reachable(from, to) && destination_ok(pos, to, parsed.is_capture),
        PieceType::Bishop => is_diagonal(from, to) && ray_clear(pos, from, to) && destination_ok(pos, to, parsed.is_capture),
        PieceType::Rook => is_straight(from, to) && ray_clear(pos, from, to) && destination_ok(pos, to, parsed.is_capture),
        PieceType::Queen => {
            (is_straight(from, to) || is_diagonal(from, to))
                && ray_clear(pos, from, to)
                && destination_ok(pos, to, parsed.is_capture)
        }
    }
}

fn destination_ok(pos: &Position, to: Square, is_capture: bool) -> bool {
    let occupant = pos.piece_at(to);
    if is_capture {
        !occupant.is_none() && occupant.color() != Some(pos.side_to_move)
    } else {
        occupant.is_none()
    }
}

fn pawn_reachable(pos: &Position, from: Square, to: Square, is_capture: bool) -> bool {
    let color = pos.side_to_move;
    let dir = color.pawn_direction() as i32;
    let from_rank = from.rank().index() as i32;
    let from_file = from.file().index() as i32;
    let to_rank = to.rank().index() as i32;
    let to_file = to.file().index() as i32;

    if is_capture {
        if (to_file - from_file).abs() != 1 || to_rank - from_rank != dir {
            return false;
        }
        let occupant = pos.piece_at(to);
        if !occupant.is_none() && occupant.color() != Some(color) {
            return true;
        }
        pos.en_passant == Some(to)
    } else {
        if to_file != from_file {
            return false;
        }
        let single = from_rank + dir;
        if to_rank == single {
            return pos.piece_at(to).is_none();
        }
        if from_rank == color.pawn_home_rank() as i32 {
            let double = from_rank + 2 * dir;
            if to_rank == double {
                let mid = Square::new(
                    File::from_index(from_file as u8).unwrap(),
                    Rank::from_index(single as u8).unwrap(),
                );
                return pos.piece_at(to).is_none() && pos.piece_at(mid).is_none();
            }
        }
        false
    }
}

fn knight_reachable(from: Square, to: Square) -> bool {
    let df = (to.file().index() as i32 - from.file().index() as i32).abs();
    let dr = (to.rank().index() as i32 - from.rank().index() as i32).abs();
    (df == 1 && dr == 2) || (df == 2 && dr == 1)
}

fn king_reachable(from: Square, to: Square) -> bool {
    let df = (to.file().index() as i32 - from.file().index() as i32).abs();
    let dr = (to.rank().index() as i32 - from.rank().index() as i32).abs();
    df <= 1 && dr <= 1 && (df != 0 || dr != 0)
}

fn is_straight(from: Square, to: Square) -> bool {
    from != to && (from.file() == to.file() || from.rank() == to.rank())
}

fn is_diagonal(from: Square, to: Square) -> bool {
    let df = (to.file().index() as i32 - from.file().index() as i32).abs();
    let dr = (to.rank().index() as i32 - from.rank().index() as i32).abs();
    df == dr && df != 0
}

fn ray_clear(pos: &Position, from: Square, to: Square) -> bool {
    let step_x = (to.file().index() as i32 - from.file().index() as i32).signum();
    let step_y = (to.rank().index() as i32 - from.rank().index() as i32).signum();
    let mut x = from.file().index() as i32 + step_x;
    let mut y = from.rank().index() as i32 + step_y;
    while (x, y) != (to.file().index() as i32, to.rank().index() as i32) {
        let sq = Square::new(
            File::from_index(x as u8).unwrap(),
            Rank::from_index(y as u8).unwrap(),
        );
        if !pos.piece_at(sq).is_none() {
            return false;
        }
        x += step_x;
        y += step_y;
    }
    true
}

fn apply_resolved(pos: &Position, from: Square, parsed: &ParsedSan) -> Position {
    let mut next = *pos;
    let moving_piece = pos.piece_at(from);
    let to = parsed.to_square;

    // Read the pre-move destination occupancy before overwriting it: the
    // reference implementation reads this after the overwrite and
    // miscomputes the halfmove-clock reset for some captures.
    let destination_was_occupied = !pos.piece_at(to).is_none();
    let is_en_passant_capture =
        parsed.piece_type == PieceType::Pawn && parsed.is_capture && !destination_was_occupied;

    next.set(from, Piece::NONE);

    if is_en_passant_capture {
        let dir = pos.side_to_move.pawn_direction() as i32;
        let captured_rank = to.rank().index() as i32 - dir;
        let captured_sq = Square::new(to.file(), Rank::from_index(captured_rank as u8).unwrap());
        next.set(captured_sq, Piece::NONE);
    }

    let placed = match parsed.promotion {
        Some(promo) => Piece::new(promo, pos.side_to_move),
        None => moving_piece,
    };
    next.set(to, placed);

    next.en_passant = pawn_double_push_ep_square(parsed, from, to);

    let is_capture_for_clock = destination_was_occupied || is_en_passant_capture;
    next.halfmove_clock = if parsed.piece_type == PieceType::Pawn || is_capture_for_clock {
        0
    } else {
        pos.halfmove_clock + 1
    };

    update_castling_rights(&mut next, pos.side_to_move, parsed.piece_type, from, to);

    if pos.side_to_move == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = pos.side_to_move.opposite();

    next
}

fn pawn_double_push_ep_square(parsed: &ParsedSan, from: Square, to: Square) -> Option<Square> {
    if parsed.piece_type != PieceType::Pawn {
        return None;
    }
    let from_rank = from.rank().index() as i32;
    let to_rank = to.rank().index() as i32;
    if (to_rank - from_rank).abs() != 2 {
        return None;
    }
    let mid_rank = (from_rank + to_rank) / 2;
    Some(Square::new(from.file(), Rank::from_index(mid_rank as u8).unwrap()))
}

fn update_castling_rights(next: &mut Position, mover: Color, piece_type: PieceType, from: Square, to: Square) {
    if piece_type == PieceType::King {
        let both = match mover {
            Color::White => position::WHITE_KINGSIDE | position::WHITE_QUEENSIDE,
            Color::Black => position::BLACK_KINGSIDE | position::BLACK_QUEENSIDE,
        };
        next.clear_castling(both);
    }
    for (sq, right) in [
        (Square::A1, position::WHITE_QUEENSIDE),
        (Square::H1, position::WHITE_KINGSIDE),
        (Square::A8, position::BLACK_QUEENSIDE),
        (Square::H8, position::BLACK_KINGSIDE),
    ] {
        if from == sq || to == sq {
            next.clear_castling(right);
        }
    }
}

fn apply_castle(pos: &Position, side: CastleSide) -> Result<Position, ApplyError> {
    let color = pos.side_to_move;
    let back_rank = color.back_rank();
    let (king_from, king_to, rook_from, rook_to, right_bit) = match (color, side) {
        (Color::White, CastleSide::Kingside) => (4u8, 6u8, 7u8, 5u8, position::WHITE_KINGSIDE),
        (Color::White, CastleSide::Queenside) => (4, 2, 0, 3, position::WHITE_QUEENSIDE),
        (Color::Black, CastleSide::Kingside) => (4, 6, 7, 5, position::BLACK_KINGSIDE),
        (Color::Black, CastleSide::Queenside) => (4, 2, 0, 3, position::BLACK_QUEENSIDE),
    };

    if !pos.can_castle(right_bit) {
        return Err(ApplyError::IllegalCastle);
    }

    let sq = |file: u8| Square::new(File::from_index(file).unwrap(), Rank::from_index(back_rank).unwrap());

    let mut next = *pos;
    next.set(sq(king_from), Piece::NONE);
    next.set(sq(rook_from), Piece::NONE);
    next.set(sq(king_to), Piece::new(PieceType::King, color));
    next.set(sq(rook_to), Piece::new(PieceType::Rook, color));

    let both = match color {
        Color::White => position::WHITE_KINGSIDE | position::WHITE_QUEENSIDE,
        Color::Black => position::BLACK_KINGSIDE | position::BLACK_QUEENSIDE,
    };
    next.clear_castling(both);
    next.en_passant = None;
    next.halfmove_clock += 1;
    if color == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = color.opposite();

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::san;

    fn apply_san(pos: &Position, san_str: &str) -> Position {
        let parsed = san::parse(san_str).unwrap();
        apply_move(pos, &parsed).unwrap()
    }

    #[test]
    fn ruy_lopez_through_castling() {
        let mut pos = Position::startpos();
        for mv in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O"] {
            pos = apply_san(&pos, mv);
        }
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(
            pos.piece_at(Square::E8).kind(),
            Some(PieceType::King),
            "black king should still be on e8"
        );
        assert_eq!(pos.castling_rights, position::BLACK_KINGSIDE | position::BLACK_QUEENSIDE);
    }

    #[test]
    fn en_passant_square_and_capture() {
        let mut pos = Position::startpos();
        for mv in ["e4", "d5", "e5", "f5"] {
            pos = apply_san(&pos, mv);
        }
        assert_eq!(pos.en_passant, Square::from_algebraic("f6"));

        let after_capture = apply_san(&pos, "exf6");
        assert!(after_capture.piece_at(Square::from_algebraic("f5").unwrap()).is_none());
        assert_eq!(
            after_capture.piece_at(Square::from_algebraic("f6").unwrap()).kind(),
            Some(PieceType::Pawn)
        );
    }

    #[test]
    fn promotion_places_new_piece() {
        let mut pos = Position::empty();
        pos.side_to_move = Color::White;
        pos.set(Square::E1, Piece::new(PieceType::King, Color::White));
        pos.set(Square::E8, Piece::new(PieceType::King, Color::Black));
        pos.set(Square::from_algebraic("e7").unwrap(), Piece::new(PieceType::Pawn, Color::White));

        let after = apply_san(&pos, "e8=Q");
        assert_eq!(after.piece_at(Square::E8).kind(), Some(PieceType::Queen));
        assert_eq!(after.piece_at(Square::E8).color(), Some(Color::White));
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_move_and_capture() {
        let mut pos = Position::startpos();
        pos = apply_san(&pos, "Nf3");
        assert_eq!(pos.halfmove_clock, 1);
        pos = apply_san(&pos, "d5");
        assert_eq!(pos.halfmove_clock, 0);
    }

    #[test]
    fn ambiguous_move_is_rejected() {
        let mut pos = Position::empty();
        pos.side_to_move = Color::White;
        pos.set(Square::A1, Piece::new(PieceType::Rook, Color::White));
        pos.set(Square::H1, Piece::new(PieceType::Rook, Color::White));
        pos.set(Square::E1, Piece::new(PieceType::King, Color::White));
        pos.set(Square::E8, Piece::new(PieceType::King, Color::Black));
        let parsed = san::parse("Rd1").unwrap();
        assert_eq!(apply_move(&pos, &parsed), Err(ApplyError::AmbiguousMove));
    }

    #[test]
    fn no_matching_piece_is_rejected() {
        let pos = Position::startpos();
        let parsed = san::parse("Nd5").unwrap();
        assert_eq!(apply_move(&pos, &parsed), Err(ApplyError::NoMatchingPiece));
    }

    #[test]
    fn castling_without_rights_fails() {
        let mut pos = Position::startpos();
        pos.clear_castling(position::WHITE_KINGSIDE | position::WHITE_QUEENSIDE);
        let parsed = san::parse("O-O").unwrap();
        assert_eq!(apply_move(&pos, &parsed), Err(ApplyError::IllegalCastle));
    }
}
