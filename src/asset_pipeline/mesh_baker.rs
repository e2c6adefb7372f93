use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::model::{Mesh, Vertex};

pub struct PrimitiveBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshInfo {
    pub index_count: u32,
    pub first_index: u32,
    pub vertex_offset: u32,
    _padding: u32,

    // w coordinates are unused
    pub aabb_min: Vec4,
    pub aabb_max: Vec4,
}

pub struct BakedMeshes {
    pub buffers: PrimitiveBuffers,
    pub meshes: Vec<MeshInfo>,
}

/// Packs meshes into shared vertex and index arrays. Indices stay relative to
/// each mesh, so draws must apply `vertex_offset`.
pub fn bake_meshes(meshes: &[&Mesh]) -> BakedMeshes {
    let mut buffers = PrimitiveBuffers {
        vertices: Vec::new(),
        indices: Vec::new(),
    };
    let mut infos = Vec::with_capacity(meshes.len());

    for mesh in meshes {
        let vertex_offset = buffers.vertices.len() as u32;
        let first_index = buffers.indices.len() as u32;

        buffers.vertices.extend(mesh.interleaved_vertices());
        buffers.indices.extend(mesh.indices.iter());

        let (aabb_min, aabb_max) = mesh
            .bounds()
            .map_or((Vec4::ZERO, Vec4::ZERO), |aabb| {
                (aabb.min.extend(0.0), aabb.max.extend(0.0))
            });

        infos.push(MeshInfo {
            first_index,
            index_count: mesh.indices.len() as u32,
            vertex_offset,
            _padding: 0,
            aabb_min,
            aabb_max,
        });
    }

    BakedMeshes {
        buffers,
        meshes: infos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cube_mesh;
    use glam::Vec3;

    #[test]
    fn meshes_are_packed_back_to_back() {
        let small = cube_mesh("small", 0.5);
        let large = cube_mesh("large", 2.0);

        let baked = bake_meshes(&[&small, &large]);

        assert_eq!(baked.buffers.vertices.len(), 48);
        assert_eq!(baked.buffers.indices.len(), 72);
        assert_eq!(baked.meshes[1].vertex_offset, 24);
        assert_eq!(baked.meshes[1].first_index, 36);
        assert_eq!(baked.meshes[1].index_count, 36);
        assert_eq!(baked.meshes[1].aabb_max, Vec3::splat(2.0).extend(0.0));
    }

    #[test]
    fn empty_mesh_gets_zero_bounds() {
        let baked = bake_meshes(&[&Mesh::new("empty")]);

        assert_eq!(baked.meshes[0].index_count, 0);
        assert_eq!(baked.meshes[0].aabb_min, Vec4::ZERO);
    }
}
