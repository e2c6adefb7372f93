// glTF exports often leave tangents out; mikktspace fills them in from normals and uvs.

use anyhow::bail;
use bevy_mikktspace::{generate_tangents, Geometry};
use glam::{Vec2, Vec3, Vec4};

use crate::model::Mesh;

impl Mesh {
    fn vertex_index(&self, face: usize, vert: usize) -> usize {
        self.indices[face * 3 + vert] as usize
    }
}

impl Geometry for Mesh {
    fn num_faces(&self) -> usize {
        self.triangle_count()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.positions[self.vertex_index(face, vert)].to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        let index = self.vertex_index(face, vert);
        self.normals
            .as_ref()
            .map_or(Vec3::ZERO, |normals| normals[index])
            .to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        let index = self.vertex_index(face, vert);
        self.tex_coords
            .as_ref()
            .map_or(Vec2::ZERO, |uvs| uvs[index])
            .to_array()
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let index = self.vertex_index(face, vert);
        let vertex_count = self.vertex_count();
        let tangents = self
            .tangents
            .get_or_insert_with(|| vec![Vec4::ZERO; vertex_count]);
        tangents[index] = Vec4::from_array(tangent);
    }
}

impl Mesh {
    /// Generate tangents for this mesh using the mikktspace algorithm
    pub fn generate_tangents(&mut self) -> anyhow::Result<()> {
        if self.normals.is_none() || self.tex_coords.is_none() {
            bail!("Tangent generation needs normals and uvs: {}", self.name);
        }

        self.validate()?;

        if !generate_tangents(self) {
            bail!("Failed to generate tangents for {}", self.name)
        }

        Ok(())
    }
}
