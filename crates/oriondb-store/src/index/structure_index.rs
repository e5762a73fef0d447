//! Pawn-structure classification lookup: one bucket per
//! [`PawnStructure`] variant.

use std::collections::HashSet;

use oriondb_core::PawnStructure;

use crate::model::GamePosition;

pub(crate) const VARIANT_COUNT: usize = 9;

fn variant_index(structure: PawnStructure) -> usize {
    use PawnStructure::*;
    match structure {
        Iqp => 0,
        Carlsbad => 1,
        MaroczyBind => 2,
        HangingPawns => 3,
        PawnChain => 4,
        DoubledPawns => 5,
        PassedPawn => 6,
        BackwardPawn => 7,
        None => 8,
    }
}

/// Inverse of [`variant_index`], used to recover the variant when
/// replaying buckets back out of the sidecar file.
pub(crate) fn variant_at(index: usize) -> PawnStructure {
    use PawnStructure::*;
    match index {
        0 => Iqp,
        1 => Carlsbad,
        2 => MaroczyBind,
        3 => HangingPawns,
        4 => PawnChain,
        5 => DoubledPawns,
        6 => PassedPawn,
        7 => BackwardPawn,
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct StructureIndex {
    buckets: [HashSet<GamePosition>; VARIANT_COUNT],
}

impl Default for StructureIndex {
    fn default() -> Self {
        StructureIndex {
            buckets: Default::default(),
        }
    }
}

impl StructureIndex {
    pub fn record(&mut self, structure: PawnStructure, position: GamePosition) {
        self.buckets[variant_index(structure)].insert(position);
    }

    pub fn get(&self, structure: PawnStructure) -> &HashSet<GamePosition> {
        &self.buckets[variant_index(structure)]
    }

    pub(crate) fn buckets(&self) -> &[HashSet<GamePosition>; VARIANT_COUNT] {
        &self.buckets
    }

    pub(crate) fn from_buckets(buckets: [HashSet<GamePosition>; VARIANT_COUNT]) -> Self {
        StructureIndex { buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_into_the_matching_bucket_only() {
        let mut index = StructureIndex::default();
        index.record(
            PawnStructure::DoubledPawns,
            GamePosition {
                game_id: 1,
                ply: 2,
                fen: String::new(),
            },
        );
        assert_eq!(index.get(PawnStructure::DoubledPawns).len(), 1);
        assert_eq!(index.get(PawnStructure::PassedPawn).len(), 0);
    }
}
