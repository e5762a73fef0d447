//! The seven in-memory index types built during ingest, aggregated into
//! one [`IndexSet`] and serialized together to the `.idx` sidecar.

pub mod comment_index;
pub mod material_index;
pub mod metadata;
pub mod motif_index;
pub mod move_index;
pub mod position_index;
pub mod structure_index;

pub use comment_index::CommentIndex;
pub use material_index::MaterialIndex;
pub use metadata::MetadataIndex;
pub use motif_index::MotifIndex;
pub use move_index::MoveIndex;
pub use position_index::PositionIndex;
pub use structure_index::StructureIndex;

/// Every index an [`crate::builder::Ingestor`] may build, gated
/// individually by [`crate::config::IngestConfig`]. Always contains the
/// metadata index; the rest are empty unless their config flag was set.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    pub metadata: MetadataIndex,
    pub position: PositionIndex,
    pub material: MaterialIndex,
    pub structure: StructureIndex,
    pub moves: MoveIndex,
    pub motifs: MotifIndex,
    pub comments: CommentIndex,
}
