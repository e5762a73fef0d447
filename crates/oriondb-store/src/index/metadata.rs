//! Game-level lookup: archive offsets plus inverted indexes over the
//! Seven Tag Roster fields used for coarse filtering.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-game archive offsets and tag-derived inverted indexes.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    /// Archive offset of each game's record, the sole source of truth
    /// for mapping a game id back to its bytes.
    pub game_offset: HashMap<u32, u64>,
    /// Lowercased, trimmed player name (White or Black) to game ids.
    pub player: HashMap<String, HashSet<u32>>,
    /// Lowercased, trimmed Event tag to game ids.
    pub event: HashMap<String, HashSet<u32>>,
    /// Uppercased ECO tag to game ids.
    pub eco: HashMap<String, HashSet<u32>>,
    /// Literal Result tag value to game ids.
    pub result: HashMap<String, HashSet<u32>>,
    /// WhiteElo/BlackElo (whichever present) to game ids, ordered for
    /// range queries.
    pub elo: BTreeMap<u32, HashSet<u32>>,
    /// Date tag (kept as its PGN string form, "????.??.??" sorts first)
    /// to game ids, ordered for range queries.
    pub date: BTreeMap<String, HashSet<u32>>,
}

impl MetadataIndex {
    pub fn record_offset(&mut self, game_id: u32, offset: u64) {
        self.game_offset.insert(game_id, offset);
    }

    pub fn record_player(&mut self, game_id: u32, name: &str) {
        let key = name.trim().to_lowercase();
        if key.is_empty() || key == "?" {
            return;
        }
        self.player.entry(key).or_default().insert(game_id);
    }

    pub fn record_event(&mut self, game_id: u32, event: &str) {
        let key = event.trim().to_lowercase();
        if key.is_empty() || key == "?" {
            return;
        }
        self.event.entry(key).or_default().insert(game_id);
    }

    pub fn record_eco(&mut self, game_id: u32, eco: &str) {
        let key = eco.trim().to_uppercase();
        if key.is_empty() {
            return;
        }
        self.eco.entry(key).or_default().insert(game_id);
    }

    pub fn record_result(&mut self, game_id: u32, result: &str) {
        self.result
            .entry(result.to_string())
            .or_default()
            .insert(game_id);
    }

    pub fn record_elo(&mut self, game_id: u32, elo: u32) {
        self.elo.entry(elo).or_default().insert(game_id);
    }

    pub fn record_date(&mut self, game_id: u32, date: &str) {
        if date.is_empty() {
            return;
        }
        self.date
            .entry(date.to_string())
            .or_default()
            .insert(game_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_lookup_is_case_and_whitespace_insensitive() {
        let mut index = MetadataIndex::default();
        index.record_player(1, "  Magnus Carlsen  ");
        assert!(index.player["magnus carlsen"].contains(&1));
    }

    #[test]
    fn unknown_tag_value_is_not_indexed() {
        let mut index = MetadataIndex::default();
        index.record_player(1, "?");
        index.record_event(1, "?");
        assert!(index.player.is_empty());
        assert!(index.event.is_empty());
    }

    #[test]
    fn eco_is_uppercased() {
        let mut index = MetadataIndex::default();
        index.record_eco(1, "b90");
        assert!(index.eco["B90"].contains(&1));
    }
}
