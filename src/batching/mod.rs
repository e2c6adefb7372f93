//! Static batching of placed templates: per-material mesh merging and
//! approximate collider re-creation.

pub mod collider_batcher;
pub mod config;
pub mod geometry_source;
pub mod mesh_batcher;
pub mod mesh_buffer;
pub mod ordering;
pub mod output;
pub mod placement;

pub use collider_batcher::{ColliderBatchOutcome, ColliderBatcher, UnsupportedCollider};
pub use config::BatchConfig;
pub use geometry_source::{ColliderPrimitive, GeometrySource, SubMesh};
pub use mesh_batcher::{vertex_budget_groups, MeshBatcher};
pub use mesh_buffer::{AggregationEntry, MeshAggregationBuffer};
pub use output::BatchOutput;
pub use placement::Placement;

use crate::error::{BatchError, Result};

/// Batchers register placements until they are finalized, exactly once.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatcherState {
    #[default]
    Registering,
    Finalized,
}

impl BatcherState {
    fn ensure_registering(self) -> Result<()> {
        match self {
            BatcherState::Registering => Ok(()),
            BatcherState::Finalized => Err(BatchError::AlreadyFinalized),
        }
    }
}
