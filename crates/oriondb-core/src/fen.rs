//! FEN (Forsyth-Edwards Notation) codec for [`Position`].

use thiserror::Error;

use crate::piece::{Color, Piece};
use crate::position::{self, Position};
use crate::square::Square;

pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors produced while parsing a FEN string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 6 space-separated fields, found {0}")]
    InvalidPartCount(usize),
    #[error("invalid piece placement field: {0}")]
    InvalidPiecePlacement(String),
    #[error("invalid active color field: {0}")]
    InvalidActiveColor(String),
    #[error("invalid castling availability field: {0}")]
    InvalidCastlingRights(String),
    #[error("invalid en passant target field: {0}")]
    InvalidEnPassantSquare(String),
    #[error("invalid halfmove clock field: {0}")]
    InvalidHalfmoveClock(String),
    #[error("invalid fullmove number field: {0}")]
    InvalidFullmoveNumber(String),
}

/// Parses a FEN string into a [`Position`].
pub fn parse(fen: &str) -> Result<Position, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(FenError::InvalidPartCount(parts.len()));
    }

    let mut pos = Position::empty();
    parse_piece_placement(&mut pos, parts[0])?;
    pos.side_to_move = parse_active_color(parts[1])?;
    pos.castling_rights = parse_castling(parts[2])?;
    pos.en_passant = parse_en_passant(parts[3])?;
    pos.halfmove_clock = parts[4]
        .parse()
        .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
    pos.fullmove_number = parts[5]
        .parse()
        .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

    Ok(pos)
}

fn parse_piece_placement(pos: &mut Position, field: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(field.to_string()));
    }

    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank_index = 7 - rank_from_top as u8;
        let mut file_index = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file_index += skip as u8;
            } else {
                let piece =
                    Piece::from_fen_char(c).ok_or_else(|| FenError::InvalidPiecePlacement(field.to_string()))?;
                if file_index >= 8 {
                    return Err(FenError::InvalidPiecePlacement(field.to_string()));
                }
                let sq = Square::from_index(rank_index * 8 + file_index)
                    .ok_or_else(|| FenError::InvalidPiecePlacement(field.to_string()))?;
                pos.set(sq, piece);
                file_index += 1;
            }
        }
        if file_index != 8 {
            return Err(FenError::InvalidPiecePlacement(field.to_string()));
        }
    }
    Ok(())
}

fn parse_active_color(field: &str) -> Result<Color, FenError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(FenError::InvalidActiveColor(field.to_string())),
    }
}

fn parse_castling(field: &str) -> Result<u8, FenError> {
    if field == "-" {
        return Ok(0);
    }
    let mut rights = 0u8;
    for c in field.chars() {
        rights |= match c {
            'K' => position::WHITE_KINGSIDE,
            'Q' => position::WHITE_QUEENSIDE,
            'k' => position::BLACK_KINGSIDE,
            'q' => position::BLACK_QUEENSIDE,
            _ => return Err(FenError::InvalidCastlingRights(field.to_string())),
        };
    }
    Ok(rights)
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    Square::from_algebraic(field)
        .map(Some)
        .ok_or_else(|| FenError::InvalidEnPassantSquare(field.to_string()))
}

/// Serializes a [`Position`] to FEN.
#[must_use]
pub fn to_fen(pos: &Position) -> String {
    let mut ranks = Vec::with_capacity(8);
    for rank_from_top in 0..8u8 {
        let rank_index = 7 - rank_from_top;
        let mut rank_str = String::new();
        let mut empty_run = 0u8;
        for file_index in 0..8u8 {
            let sq = Square::from_index(rank_index * 8 + file_index).unwrap();
            let piece = pos.piece_at(sq);
            if piece.is_none() {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    rank_str.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                rank_str.push(piece.to_fen_char());
            }
        }
        if empty_run > 0 {
            rank_str.push_str(&empty_run.to_string());
        }
        ranks.push(rank_str);
    }
    let placement = ranks.join("/");

    let side = match pos.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    if pos.can_castle(position::WHITE_KINGSIDE) {
        castling.push('K');
    }
    if pos.can_castle(position::WHITE_QUEENSIDE) {
        castling.push('Q');
    }
    if pos.can_castle(position::BLACK_KINGSIDE) {
        castling.push('k');
    }
    if pos.can_castle(position::BLACK_QUEENSIDE) {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let en_passant = pos
        .en_passant
        .map(Square::to_algebraic)
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{placement} {side} {castling} {en_passant} {} {}",
        pos.halfmove_clock, pos.fullmove_number
    )
}
