//! Chess primitives: squares, pieces, positions, FEN/SAN codecs, Zobrist
//! hashing, and the positional classifiers (material, pawn structure,
//! tactical motifs) that the rest of oriondb builds on.
//!
//! ```
//! use oriondb_core::{fen, san, apply, Position};
//!
//! let pos = Position::startpos();
//! let parsed = san::parse("e4").unwrap();
//! let after = apply::apply_move(&pos, &parsed).unwrap();
//! assert_eq!(fen::to_fen(&after), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
//! ```

pub mod apply;
pub mod attacks;
pub mod fen;
pub mod material;
pub mod pawn_structure;
pub mod piece;
pub mod position;
pub mod san;
pub mod square;
pub mod tactics;
pub mod zobrist;

pub use apply::{ApplyError, apply_move};
pub use fen::FenError;
pub use material::MaterialSignature;
pub use pawn_structure::PawnStructure;
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
pub use san::{CastleSide, ParsedSan, SanError};
pub use square::{File, Rank, Square};
pub use tactics::TacticalMotif;
pub use zobrist::ZOBRIST;
