//! Comparators for [`MeshBatcher::finalize_with_budget`](super::MeshBatcher::finalize_with_budget).
//!
//! Each compares the translation of two aggregated entries.

use std::cmp::Ordering;

use glam::Vec3;

/// Highest entries first, then by descending x.
pub fn by_descending_height_then_x(a: Vec3, b: Vec3) -> Ordering {
    b.y.total_cmp(&a.y).then_with(|| b.x.total_cmp(&a.x))
}

/// Nearest to `origin` first.
pub fn by_distance_from(origin: Vec3) -> impl Fn(Vec3, Vec3) -> Ordering {
    move |a, b| {
        a.distance_squared(origin)
            .total_cmp(&b.distance_squared(origin))
    }
}
