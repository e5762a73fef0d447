//! SAN lookup: which games ever played a given move, and each game's
//! own move sequence in order.

use std::collections::{HashMap, HashSet};

use crate::model::GamePosition;

#[derive(Debug, Clone, Default)]
pub struct MoveIndex {
    pub by_san: HashMap<String, HashSet<GamePosition>>,
    /// `(san, ply, fen after the move)`, ordered by ply within a game.
    pub by_game: HashMap<u32, Vec<(String, u32, String)>>,
}

impl MoveIndex {
    pub fn record(&mut self, san: &str, position: GamePosition) {
        self.by_san
            .entry(san.to_string())
            .or_default()
            .insert(position.clone());
        self.by_game.entry(position.game_id).or_default().push((
            san.to_string(),
            position.ply,
            position.fen,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_by_san_and_preserves_game_order() {
        let mut index = MoveIndex::default();
        index.record(
            "e4",
            GamePosition {
                game_id: 1,
                ply: 1,
                fen: "after-e4".to_string(),
            },
        );
        index.record(
            "e5",
            GamePosition {
                game_id: 1,
                ply: 2,
                fen: "after-e5".to_string(),
            },
        );
        assert_eq!(index.by_san["e4"].len(), 1);
        assert_eq!(index.by_game[&1].len(), 2);
        assert_eq!(index.by_game[&1][0].0, "e4");
    }
}
