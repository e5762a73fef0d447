//! Tactical-motif lookup: one bucket per [`TacticalMotif`] variant, plus
//! a per-game ply-ordered view for "show me where the tactics happened
//! in this game".

use std::collections::{BTreeMap, HashMap, HashSet};

use oriondb_core::TacticalMotif;

use crate::model::GamePosition;

pub(crate) const VARIANT_COUNT: usize = 12;

fn variant_index(motif: TacticalMotif) -> usize {
    use TacticalMotif::*;
    match motif {
        Pin => 0,
        Fork => 1,
        Skewer => 2,
        DiscoveredAttack => 3,
        DoubleAttack => 4,
        Sacrifice => 5,
        Deflection => 6,
        Decoy => 7,
        RemovalOfDefender => 8,
        Interference => 9,
        Overloading => 10,
        Zugzwang => 11,
    }
}

/// Inverse of [`variant_index`], used when replaying buckets back out
/// of the sidecar file.
pub(crate) fn variant_at(index: usize) -> TacticalMotif {
    use TacticalMotif::*;
    match index {
        0 => Pin,
        1 => Fork,
        2 => Skewer,
        3 => DiscoveredAttack,
        4 => DoubleAttack,
        5 => Sacrifice,
        6 => Deflection,
        7 => Decoy,
        8 => RemovalOfDefender,
        9 => Interference,
        10 => Overloading,
        _ => Zugzwang,
    }
}

#[derive(Debug, Clone)]
pub struct MotifIndex {
    buckets: [HashSet<GamePosition>; VARIANT_COUNT],
    pub by_game: HashMap<u32, BTreeMap<u32, HashSet<TacticalMotif>>>,
}

impl Default for MotifIndex {
    fn default() -> Self {
        MotifIndex {
            buckets: Default::default(),
            by_game: HashMap::new(),
        }
    }
}

impl MotifIndex {
    pub fn record(&mut self, motif: TacticalMotif, position: GamePosition) {
        self.by_game
            .entry(position.game_id)
            .or_default()
            .entry(position.ply)
            .or_default()
            .insert(motif);
        self.buckets[variant_index(motif)].insert(position);
    }

    pub fn get(&self, motif: TacticalMotif) -> &HashSet<GamePosition> {
        &self.buckets[variant_index(motif)]
    }

    pub(crate) fn buckets(&self) -> &[HashSet<GamePosition>; VARIANT_COUNT] {
        &self.buckets
    }

    pub(crate) fn from_parts(
        buckets: [HashSet<GamePosition>; VARIANT_COUNT],
        by_game: HashMap<u32, BTreeMap<u32, HashSet<TacticalMotif>>>,
    ) -> Self {
        MotifIndex { buckets, by_game }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_into_bucket_and_per_game_timeline() {
        let mut index = MotifIndex::default();
        index.record(
            TacticalMotif::Fork,
            GamePosition {
                game_id: 1,
                ply: 12,
                fen: String::new(),
            },
        );
        assert_eq!(index.get(TacticalMotif::Fork).len(), 1);
        assert!(index.by_game[&1][&12].contains(&TacticalMotif::Fork));
    }
}
