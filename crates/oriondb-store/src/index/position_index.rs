//! Zobrist-hash to position lookup, for finding every game that ever
//! reached a given position.

use std::collections::HashMap;

use crate::model::GamePosition;

#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    pub by_hash: HashMap<u64, Vec<GamePosition>>,
}

impl PositionIndex {
    pub fn record(&mut self, hash: u64, position: GamePosition) {
        self.by_hash.entry(hash).or_default().push(position);
    }

    /// Number of distinct `(game_id, ply)` entries sharing a hash,
    /// including both genuine repetitions and hash collisions.
    pub fn collisions(&self, hash: u64) -> usize {
        self.by_hash.get(&hash).map_or(0, Vec::len)
    }
}
