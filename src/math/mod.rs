pub mod bounds;

pub use bounds::{Aabb, BoundingSphere};
