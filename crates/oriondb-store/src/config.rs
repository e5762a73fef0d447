//! Ingest-time configuration: which indexes to build.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which optional indexes an [`crate::builder::Ingestor`] should build
/// during ingest. Plain, `Copy`, and `serde`-round-trippable so an
/// embedding application can load it from its own config file without
/// this crate depending on a config format itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Builds the position, material, and pawn-structure indexes.
    pub enable_position_indexing: bool,
    /// Builds the tokenized comment index.
    pub enable_comment_indexing: bool,
    /// Builds the move index. Requires `enable_position_indexing`.
    pub enable_move_indexing: bool,
    /// Builds the tactical-motif index. Requires `enable_position_indexing`.
    pub enable_motif_indexing: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            enable_position_indexing: true,
            enable_comment_indexing: true,
            enable_move_indexing: true,
            enable_motif_indexing: true,
        }
    }
}

impl IngestConfig {
    /// Checks the dependency between move/motif indexing and position
    /// indexing before any ingest work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enable_move_indexing && !self.enable_position_indexing {
            return Err(ConfigError::MoveIndexingRequiresPositionIndexing);
        }
        if self.enable_motif_indexing && !self.enable_position_indexing {
            return Err(ConfigError::MotifIndexingRequiresPositionIndexing);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything() {
        let config = IngestConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.enable_position_indexing);
        assert!(config.enable_move_indexing);
    }

    #[test]
    fn move_indexing_without_position_indexing_is_rejected() {
        let config = IngestConfig {
            enable_position_indexing: false,
            enable_move_indexing: true,
            ..IngestConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MoveIndexingRequiresPositionIndexing)
        );
    }

    #[test]
    fn motif_indexing_without_position_indexing_is_rejected() {
        let config = IngestConfig {
            enable_position_indexing: false,
            enable_move_indexing: false,
            enable_motif_indexing: true,
            enable_comment_indexing: false,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MotifIndexingRequiresPositionIndexing)
        );
    }

    #[test]
    fn comment_indexing_alone_needs_no_position_indexing() {
        let config = IngestConfig {
            enable_position_indexing: false,
            enable_comment_indexing: true,
            enable_move_indexing: false,
            enable_motif_indexing: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn roundtrips_through_json() {
        let config = IngestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: IngestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
