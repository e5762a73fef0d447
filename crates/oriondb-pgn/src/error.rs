//! Non-fatal parse errors collected while scanning a PGN stream.

use thiserror::Error;

/// A single malformed game, reported with its byte offset inside that
/// game's reconstructed movetext so the caller can locate the problem.
/// Never propagated as a hard failure: the parser records these and
/// continues with the next game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed game at movetext offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}
