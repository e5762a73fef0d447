//! Standard Algebraic Notation: a pure string-to-descriptor parser.
//!
//! This module never touches a board. It turns a SAN token into a
//! [`ParsedSan`] descriptor describing what the token says, leaving all
//! legality and source-square resolution to [`crate::apply`].

use thiserror::Error;

use crate::piece::PieceType;
use crate::square::{File, Rank, Square};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN token")]
    Empty,
    #[error("invalid SAN token: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// Everything a SAN token says about a move, before any board is
/// consulted. `is_check`/`is_mate` are taken verbatim from the trailing
/// `+`/`#` glyph — never computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSan {
    pub piece_type: PieceType,
    pub to_square: Square,
    pub from_file: Option<u8>,
    pub from_rank: Option<u8>,
    pub is_capture: bool,
    pub castle_side: Option<CastleSide>,
    pub promotion: Option<PieceType>,
    pub is_check: bool,
    pub is_mate: bool,
}

/// Parses a single SAN token (no leading move number, no trailing NAG).
pub fn parse(san: &str) -> Result<ParsedSan, SanError> {
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let mut body = san;
    let mut is_mate = false;
    let mut is_check = false;
    if let Some(stripped) = body.strip_suffix('#') {
        is_mate = true;
        body = stripped;
    } else if let Some(stripped) = body.strip_suffix('+') {
        is_check = true;
        body = stripped;
    }

    if body.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    if body == "O-O-O" || body == "0-0-0" {
        return Ok(castling(CastleSide::Queenside, is_check, is_mate));
    }
    if body == "O-O" || body == "0-0" {
        return Ok(castling(CastleSide::Kingside, is_check, is_mate));
    }

    let (body, promotion) = split_promotion(body, san)?;

    let mut chars: Vec<char> = body.chars().collect();
    if chars.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let piece_type = if chars[0].is_ascii_uppercase() {
        let pt = PieceType::from_fen_char(chars[0])
            .filter(|t| *t != PieceType::Pawn)
            .ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;
        chars.remove(0);
        pt
    } else {
        PieceType::Pawn
    };

    if chars.len() < 2 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }
    let rank_char = chars.pop().unwrap();
    let file_char = chars.pop().unwrap();
    let to_square = Square::new(
        File::from_char(file_char).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?,
        Rank::from_char(rank_char).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?,
    );

    let is_capture = if chars.last() == Some(&'x') {
        chars.pop();
        true
    } else {
        false
    };

    let (from_file, from_rank) = parse_disambiguation(&chars, san)?;

    if piece_type == PieceType::Pawn && is_capture && from_file.is_none() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }
    if promotion.is_some() && piece_type != PieceType::Pawn {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    Ok(ParsedSan {
        piece_type,
        to_square,
        from_file,
        from_rank,
        is_capture,
        castle_side: None,
        promotion,
        is_check,
        is_mate,
    })
}

fn castling(side: CastleSide, is_check: bool, is_mate: bool) -> ParsedSan {
    ParsedSan {
        piece_type: PieceType::King,
        to_square: Square::NONE,
        from_file: None,
        from_rank: None,
        is_capture: false,
        castle_side: Some(side),
        promotion: None,
        is_check,
        is_mate,
    }
}

fn split_promotion<'a>(body: &'a str, original: &str) -> Result<(&'a str, Option<PieceType>), SanError> {
    let Some(eq_idx) = body.find('=') else {
        return Ok((body, None));
    };
    let (before, after) = body.split_at(eq_idx);
    let suffix = &after[1..];
    let mut suffix_chars = suffix.chars();
    let promo_char = suffix_chars
        .next()
        .ok_or_else(|| SanError::InvalidFormat(original.to_string()))?;
    if suffix_chars.next().is_some() {
        return Err(SanError::InvalidFormat(original.to_string()));
    }
    if !promo_char.is_ascii_uppercase() {
        return Err(SanError::InvalidFormat(original.to_string()));
    }
    let promo_type = PieceType::from_fen_char(promo_char)
        .filter(|t| *t != PieceType::Pawn && *t != PieceType::King)
        .ok_or_else(|| SanError::InvalidFormat(original.to_string()))?;
    Ok((before, Some(promo_type)))
}

fn parse_disambiguation(chars: &[char], original: &str) -> Result<(Option<u8>, Option<u8>), SanError> {
    match chars.len() {
        0 => Ok((None, None)),
        1 => {
            let c = chars[0];
            if let Some(f) = File::from_char(c) {
                Ok((Some(f.index()), None))
            } else if let Some(r) = Rank::from_char(c) {
                Ok((None, Some(r.index())))
            } else {
                Err(SanError::InvalidFormat(original.to_string()))
            }
        }
        2 => {
            let f = File::from_char(chars[0]).ok_or_else(|| SanError::InvalidFormat(original.to_string()))?;
            let r = Rank::from_char(chars[1]).ok_or_else(|| SanError::InvalidFormat(original.to_string()))?;
            Ok((Some(f.index()), Some(r.index())))
        }
        _ => Err(SanError::InvalidFormat(original.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pawn_push() {
        let parsed = parse("e4").unwrap();
        assert_eq!(parsed.piece_type, PieceType::Pawn);
        assert_eq!(parsed.to_square, Square::from_algebraic("e4").unwrap());
        assert!(!parsed.is_capture);
    }

    #[test]
    fn parses_pawn_capture_with_departure_file() {
        let parsed = parse("exd5").unwrap();
        assert_eq!(parsed.piece_type, PieceType::Pawn);
        assert_eq!(parsed.from_file, Some(File::E.index()));
        assert!(parsed.is_capture);
        assert_eq!(parsed.to_square, Square::from_algebraic("d5").unwrap());
    }

    #[test]
    fn pawn_capture_without_file_is_rejected() {
        assert!(parse("xd5").is_err());
    }

    #[test]
    fn parses_knight_move() {
        let parsed = parse("Nf3").unwrap();
        assert_eq!(parsed.piece_type, PieceType::Knight);
        assert_eq!(parsed.to_square, Square::from_algebraic("f3").unwrap());
    }

    #[test]
    fn parses_disambiguated_rook_move_by_file() {
        let parsed = parse("Rae1").unwrap();
        assert_eq!(parsed.piece_type, PieceType::Rook);
        assert_eq!(parsed.from_file, Some(File::A.index()));
        assert_eq!(parsed.from_rank, None);
    }

    #[test]
    fn parses_disambiguated_knight_by_rank() {
        let parsed = parse("N1c3").unwrap();
        assert_eq!(parsed.from_rank, Some(Rank::R1.index()));
        assert_eq!(parsed.from_file, None);
    }

    #[test]
    fn parses_disambiguated_by_file_and_rank() {
        let parsed = parse("Qh4e1").unwrap();
        assert_eq!(parsed.from_file, Some(File::H.index()));
        assert_eq!(parsed.from_rank, Some(Rank::R4.index()));
    }

    #[test]
    fn parses_capture() {
        let parsed = parse("Nxe5").unwrap();
        assert!(parsed.is_capture);
    }

    #[test]
    fn parses_promotion() {
        let parsed = parse("e8=Q").unwrap();
        assert_eq!(parsed.promotion, Some(PieceType::Queen));
        assert_eq!(parsed.to_square, Square::from_algebraic("e8").unwrap());
    }

    #[test]
    fn parses_capture_promotion() {
        let parsed = parse("exd8=N").unwrap();
        assert!(parsed.is_capture);
        assert_eq!(parsed.promotion, Some(PieceType::Knight));
    }

    #[test]
    fn rejects_promotion_on_non_pawn() {
        assert!(parse("Nf3=Q").is_err());
    }

    #[test]
    fn parses_castling_both_sides_both_glyph_styles() {
        assert_eq!(parse("O-O").unwrap().castle_side, Some(CastleSide::Kingside));
        assert_eq!(parse("0-0").unwrap().castle_side, Some(CastleSide::Kingside));
        assert_eq!(parse("O-O-O").unwrap().castle_side, Some(CastleSide::Queenside));
        assert_eq!(parse("0-0-0").unwrap().castle_side, Some(CastleSide::Queenside));
    }

    #[test]
    fn check_and_mate_suffixes_are_recorded_not_computed() {
        let check = parse("Qh5+").unwrap();
        assert!(check.is_check);
        assert!(!check.is_mate);

        let mate = parse("Qh5#").unwrap();
        assert!(mate.is_mate);
        assert!(!mate.is_check);

        let castle_mate = parse("O-O#").unwrap();
        assert!(castle_mate.is_mate);
        assert_eq!(castle_mate.castle_side, Some(CastleSide::Kingside));
    }

    #[test]
    fn rejects_trailing_annotation_glyphs() {
        assert!(parse("Nf3!").is_err());
        assert!(parse("Nf3?!").is_err());
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(parse(""), Err(SanError::Empty));
    }
}
