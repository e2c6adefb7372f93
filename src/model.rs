use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use gltf::buffer;
use itertools::izip;

use crate::math::Aabb;

/// Triangle-list geometry with optional vertex attribute streams.
///
/// Every present stream has exactly `positions.len()` elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    /// xyz is the tangent direction, w the bitangent sign.
    pub tangents: Option<Vec<Vec4>>,
    pub tex_coords: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Vec4>>,
    pub indices: Vec<u32>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Appends `source` to this mesh with every vertex moved by `transform`.
    ///
    /// Attribute streams present on only one side are zero-filled (colors with
    /// white) on the other, so the result carries the union of both.
    pub fn append_transformed(&mut self, source: &Mesh, transform: &Mat4) {
        let base = self.positions.len();
        let added = source.positions.len();

        self.positions.extend(
            source
                .positions
                .iter()
                .map(|position| transform.transform_point3(*position)),
        );

        let normal_matrix = transform.inverse().transpose();
        merge_stream(
            &mut self.normals,
            source.normals.as_deref(),
            base,
            added,
            Vec3::ZERO,
            |normal| normal_matrix.transform_vector3(normal).normalize_or_zero(),
        );
        merge_stream(
            &mut self.tangents,
            source.tangents.as_deref(),
            base,
            added,
            Vec4::ZERO,
            |tangent| {
                let direction = transform.transform_vector3(tangent.xyz()).normalize_or_zero();
                direction.extend(tangent.w)
            },
        );
        merge_stream(
            &mut self.tex_coords,
            source.tex_coords.as_deref(),
            base,
            added,
            Vec2::ZERO,
            |uv| uv,
        );
        merge_stream(
            &mut self.colors,
            source.colors.as_deref(),
            base,
            added,
            Vec4::ONE,
            |color| color,
        );

        let offset = base as u32;
        // Mirroring turns triangles inside out unless the winding is flipped too.
        if transform.determinant() < 0.0 {
            for triangle in source.indices.chunks(3) {
                self.indices
                    .extend(triangle.iter().rev().map(|index| index + offset));
            }
        } else {
            self.indices
                .extend(source.indices.iter().map(|index| index + offset));
        }
    }

    pub fn from_gltf_primitive(
        name: impl Into<String>,
        primitive: &gltf::Primitive,
        buffers: Buffers,
    ) -> anyhow::Result<Mesh> {
        let name = name.into();

        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(anyhow::anyhow!(
                "Unsupported primitive mode in {}: {:?}",
                name,
                primitive.mode()
            ));
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .ok_or_else(|| anyhow::anyhow!("Primitive without positions: {}", name))?
            .map(Vec3::from)
            .collect::<Vec<Vec3>>();

        let normals = reader
            .read_normals()
            .map(|normals| normals.map(Vec3::from).collect::<Vec<Vec3>>());
        let tangents = reader
            .read_tangents()
            .map(|tangents| tangents.map(Vec4::from).collect::<Vec<Vec4>>());
        let tex_coords = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().map(Vec2::from).collect::<Vec<Vec2>>());
        let colors = reader
            .read_colors(0)
            .map(|colors| colors.into_rgba_f32().map(Vec4::from).collect::<Vec<Vec4>>());

        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut mesh = Mesh {
            name,
            positions,
            normals,
            tangents,
            tex_coords,
            colors,
            indices,
        };

        mesh.validate()?;

        if mesh.tangents.is_none() && mesh.normals.is_some() && mesh.tex_coords.is_some() {
            mesh.generate_tangents()?;
        }

        Ok(mesh)
    }

    /// Checks that every attribute stream matches the vertex count and every
    /// index points at a vertex.
    pub fn validate(&self) -> anyhow::Result<()> {
        let vertex_count = self.positions.len();
        let stream_lengths = [
            self.normals.as_ref().map(Vec::len),
            self.tangents.as_ref().map(Vec::len),
            self.tex_coords.as_ref().map(Vec::len),
            self.colors.as_ref().map(Vec::len),
        ];

        if stream_lengths
            .into_iter()
            .flatten()
            .any(|len| len != vertex_count)
        {
            anyhow::bail!("Mismatched vertex attribute lengths in {}", self.name);
        }

        if let Some(index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            anyhow::bail!("Index {} out of bounds in {}", index, self.name);
        }

        Ok(())
    }

    /// Interleaves position, normal, uv and tangent for GPU upload.
    pub fn interleaved_vertices(&self) -> Vec<Vertex> {
        let normals = self
            .normals
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .copied()
            .chain(std::iter::repeat(Vec3::ZERO));
        let tex_coords = self
            .tex_coords
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .copied()
            .chain(std::iter::repeat(Vec2::ZERO));
        let tangents = self
            .tangents
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|tangent| tangent.xyz())
            .chain(std::iter::repeat(Vec3::ZERO));

        izip!(
            &self.positions,
            normals,
            tex_coords,
            tangents
        )
        .map(|(position, normal, tex_coords, tangent)| Vertex {
            position: *position,
            normal,
            tex_coords,
            tangent,
        })
        .collect()
    }
}

fn merge_stream<T: Copy>(
    target: &mut Option<Vec<T>>,
    source: Option<&[T]>,
    base: usize,
    added: usize,
    fill: T,
    map: impl Fn(T) -> T,
) {
    match (target.as_mut(), source) {
        (Some(target), Some(source)) => target.extend(source.iter().map(|value| map(*value))),
        (Some(target), None) => target.extend(std::iter::repeat(fill).take(added)),
        (None, Some(source)) => {
            let mut stream = vec![fill; base];
            stream.extend(source.iter().map(|value| map(*value)));
            *target = Some(stream);
        }
        (None, None) => {}
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
}

/// Builds an axis-aligned box with 24 vertices (4 per face) and per-face normals.
pub fn cube_mesh(name: impl Into<String>, half_extent: f32) -> Mesh {
    // (normal, right, up) with right x up == normal, so faces wind outward.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = Mesh::new(name);
    let mut normals = Vec::with_capacity(24);
    let mut tex_coords = Vec::with_capacity(24);

    for (normal, right, up) in faces {
        let base = mesh.positions.len() as u32;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        for (u, v) in corners {
            mesh.positions
                .push((normal + right * u + up * v) * half_extent);
            normals.push(normal);
            tex_coords.push(Vec2::new((u + 1.0) * 0.5, (v + 1.0) * 0.5));
        }

        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh.normals = Some(normals);
    mesh.tex_coords = Some(tex_coords);
    mesh
}
