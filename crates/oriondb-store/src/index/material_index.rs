//! Material-signature lookup, keyed both by exact signature and by
//! signed imbalance for range queries ("games where White is up a
//! rook").

use std::collections::{BTreeMap, HashMap};

use oriondb_core::MaterialSignature;

use crate::model::GamePosition;

#[derive(Debug, Clone, Default)]
pub struct MaterialIndex {
    pub by_signature: HashMap<MaterialSignature, Vec<GamePosition>>,
    pub by_imbalance: BTreeMap<i32, Vec<GamePosition>>,
}

impl MaterialIndex {
    pub fn record(&mut self, signature: MaterialSignature, imbalance: i32, position: GamePosition) {
        self.by_signature
            .entry(signature)
            .or_default()
            .push(position.clone());
        self.by_imbalance.entry(imbalance).or_default().push(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(game_id: u32, ply: u32) -> GamePosition {
        GamePosition {
            game_id,
            ply,
            fen: String::new(),
        }
    }

    #[test]
    fn records_under_both_signature_and_imbalance() {
        let mut index = MaterialIndex::default();
        let sig = MaterialSignature::default();
        index.record(sig.clone(), 0, pos(1, 10));
        assert_eq!(index.by_signature[&sig].len(), 1);
        assert_eq!(index.by_imbalance[&0].len(), 1);
    }
}
