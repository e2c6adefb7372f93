use std::cmp::Ordering;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::error::{BatchError, Result};
use crate::model::Mesh;

#[derive(Debug, Clone)]
pub struct AggregationEntry {
    pub mesh: Arc<Mesh>,
    pub transform: Mat4,
}

impl AggregationEntry {
    pub fn translation(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }
}

/// Meshes waiting to be merged into one draw call, each with its own world transform.
#[derive(Debug, Clone, Default)]
pub struct MeshAggregationBuffer {
    entries: Vec<AggregationEntry>,
}

impl MeshAggregationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Arc<Mesh>, transform: Mat4) {
        self.entries.push(AggregationEntry { mesh, transform });
    }

    pub fn add_trs(&mut self, mesh: Arc<Mesh>, position: Vec3, rotation: Quat, scale: Vec3) {
        self.add(
            mesh,
            Mat4::from_scale_rotation_translation(scale, rotation, position),
        );
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AggregationEntry] {
        &self.entries
    }

    pub fn vertex_count(&self, index: usize) -> Result<usize> {
        self.entries
            .get(index)
            .map(|entry| entry.mesh.vertex_count())
            .ok_or(BatchError::IndexOutOfRange {
                start: index,
                count: 1,
                len: self.entries.len(),
            })
    }

    pub fn total_vertex_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.mesh.vertex_count())
            .sum()
    }

    pub fn combine(&self) -> Mesh {
        combine_entries(&self.entries)
    }

    /// Merges the entries `start..start + count` in their current order.
    pub fn combine_range(&self, start: usize, count: usize) -> Result<Mesh> {
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.entries.len())
            .ok_or(BatchError::IndexOutOfRange {
                start,
                count,
                len: self.entries.len(),
            })?;

        Ok(combine_entries(&self.entries[start..end]))
    }

    /// Reorders entries by their translations. The sort is stable, so entries
    /// the comparator considers equal keep their insertion order.
    pub fn sort_by(&mut self, mut compare: impl FnMut(Vec3, Vec3) -> Ordering) {
        self.entries
            .sort_by(|a, b| compare(a.translation(), b.translation()));
    }
}

fn combine_entries(entries: &[AggregationEntry]) -> Mesh {
    let vertex_count = entries.iter().map(|e| e.mesh.vertex_count()).sum();
    let index_count = entries.iter().map(|e| e.mesh.indices.len()).sum();

    let mut combined = Mesh::new("Combined mesh");
    combined.positions.reserve(vertex_count);
    combined.indices.reserve(index_count);

    for entry in entries {
        combined.append_transformed(&entry.mesh, &entry.transform);
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cube_mesh;
    use pretty_assertions::assert_eq;

    fn mesh_with_vertices(count: usize) -> Arc<Mesh> {
        Arc::new(Mesh {
            name: format!("{count} vertices"),
            positions: vec![Vec3::ZERO; count],
            ..Default::default()
        })
    }

    fn buffer_at(xs: &[f32]) -> MeshAggregationBuffer {
        let mut buffer = MeshAggregationBuffer::new();
        for (i, x) in xs.iter().enumerate() {
            buffer.add(
                mesh_with_vertices(i + 1),
                Mat4::from_translation(Vec3::new(*x, 0.0, 0.0)),
            );
        }
        buffer
    }

    #[test]
    fn combined_vertex_count_is_sum_of_entries() {
        let cube = Arc::new(cube_mesh("cube", 0.5));
        let mut buffer = MeshAggregationBuffer::new();
        for x in 0..3 {
            buffer.add_trs(
                cube.clone(),
                Vec3::new(x as f32 * 2.0, 0.0, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            );
        }

        let combined = buffer.combine();

        assert_eq!(buffer.entry_count(), 3);
        assert_eq!(combined.vertex_count(), 72);
        assert_eq!(combined.indices.len(), 108);
        assert_eq!(combined.bounds().unwrap().max, Vec3::new(4.5, 0.5, 0.5));
    }

    #[test]
    fn vertex_count_checks_bounds() {
        let buffer = buffer_at(&[0.0, 1.0]);

        assert_eq!(buffer.vertex_count(1), Ok(2));
        assert_eq!(
            buffer.vertex_count(2),
            Err(BatchError::IndexOutOfRange {
                start: 2,
                count: 1,
                len: 2
            })
        );
    }

    #[test]
    fn combine_range_merges_only_the_range() {
        let buffer = buffer_at(&[0.0, 1.0, 2.0]);

        let combined = buffer.combine_range(1, 2).unwrap();

        assert_eq!(combined.vertex_count(), 2 + 3);
        assert_eq!(combined.positions[0], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn combine_empty_range_is_empty_mesh() {
        let buffer = buffer_at(&[0.0]);

        assert!(buffer.combine_range(1, 0).unwrap().is_empty());
    }

    #[test]
    fn combine_range_rejects_overrun() {
        let buffer = buffer_at(&[0.0, 1.0, 2.0]);

        assert!(matches!(
            buffer.combine_range(2, 2),
            Err(BatchError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            buffer.combine_range(usize::MAX, 2),
            Err(BatchError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn sort_reorders_by_translation() {
        let mut buffer = buffer_at(&[3.0, 1.0, 2.0]);

        buffer.sort_by(|a, b| a.x.total_cmp(&b.x));

        let xs: Vec<f32> = buffer.entries().iter().map(|e| e.translation().x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        // Vertex counts follow their entries.
        assert_eq!(buffer.vertex_count(0), Ok(2));
        assert_eq!(buffer.vertex_count(2), Ok(1));
    }
}
