//! Build-time static batching for placed prefab templates.
//!
//! Register placements with a [`MeshBatcher`](batching::MeshBatcher) and a
//! [`ColliderBatcher`](batching::ColliderBatcher), then finalize each once to
//! get per-material merged meshes and world-space colliders.

pub mod asset_pipeline;
pub mod batching;
pub mod error;
pub mod material_manager;
pub mod math;
pub mod model;
pub mod scene_graph;

pub use error::BatchError;
