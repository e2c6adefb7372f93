use crate::scene_graph::collider::ShapeKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("range {start}..{start}+{count} is out of bounds for {len} entries")]
    IndexOutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },
    #[error("batcher has already been finalized")]
    AlreadyFinalized,
    #[error("vertex budget must be positive, got {0}")]
    InvalidVertexBudget(usize),
    #[error("{shape:?} colliders cannot be batched (template {template})")]
    UnsupportedShape { template: String, shape: ShapeKind },
}

pub type Result<T, E = BatchError> = std::result::Result<T, E>;
