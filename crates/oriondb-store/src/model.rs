//! Cross-index position references.

use std::hash::{Hash, Hasher};

/// A single ply within a single game: identifies a position without
/// re-deriving it from the archive. Carries the FEN for convenience, but
/// equality and hashing key only on `(game_id, ply)` since a `(game_id,
/// ply)` pair already uniquely determines the position — two
/// `GamePosition`s that disagree on `fen` would indicate a replay bug,
/// not two distinct positions.
#[derive(Debug, Clone)]
pub struct GamePosition {
    pub game_id: u32,
    pub ply: u32,
    pub fen: String,
}

impl PartialEq for GamePosition {
    fn eq(&self, other: &Self) -> bool {
        self.game_id == other.game_id && self.ply == other.ply
    }
}

impl Eq for GamePosition {}

impl Hash for GamePosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.game_id.hash(state);
        self.ply.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_fen() {
        let a = GamePosition {
            game_id: 1,
            ply: 4,
            fen: "one".to_string(),
        };
        let b = GamePosition {
            game_id: 1,
            ply: 4,
            fen: "two".to_string(),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_game_or_ply_is_distinct() {
        let a = GamePosition {
            game_id: 1,
            ply: 4,
            fen: "x".to_string(),
        };
        let b = GamePosition {
            game_id: 2,
            ply: 4,
            fen: "x".to_string(),
        };
        assert_ne!(a, b);
    }
}
