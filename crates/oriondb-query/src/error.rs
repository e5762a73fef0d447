//! CQL lexing, parsing, and compilation errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CqlError {
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedCharacter(char, usize),
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),
    #[error("expected {expected}, found {found:?}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("operator {op:?} is not valid on field {field:?}")]
    InvalidOperator { field: String, op: String },
    #[error("field {0:?} expects a string value")]
    ExpectedString(String),
    #[error("field {0:?} expects a numeric value")]
    ExpectedNumber(String),
    #[error("unknown pawn structure tag {0:?}")]
    UnknownPawnStructure(String),
    #[error("unknown tactical motif tag {0:?}")]
    UnknownTacticalMotif(String),
}
