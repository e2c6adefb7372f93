use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;

use glam::{Quat, Vec3};

use crate::batching::config::BatchConfig;
use crate::batching::geometry_source::{GeometrySource, SubMesh, TemplateCache};
use crate::batching::mesh_buffer::MeshAggregationBuffer;
use crate::batching::output::BatchOutput;
use crate::batching::placement::Placement;
use crate::batching::BatcherState;
use crate::error::{BatchError, Result};

/// Merges placed template meshes into one mesh per material.
///
/// Placements are registered with [`add`](Self::add); a single finalize call then
/// emits the merged meshes. Any call after finalizing fails with
/// [`BatchError::AlreadyFinalized`].
pub struct MeshBatcher<'a, S: GeometrySource> {
    source: &'a S,
    state: BatcherState,
    templates: TemplateCache<S::Template, SubMesh<S::Material>>,
    buffers: BTreeMap<S::Material, MeshAggregationBuffer>,
}

impl<'a, S: GeometrySource> MeshBatcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            state: BatcherState::Registering,
            templates: TemplateCache::new(),
            buffers: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> BatcherState {
        self.state
    }

    pub fn add(
        &mut self,
        template: S::Template,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Result<()> {
        self.add_placement(&Placement {
            template,
            position,
            rotation,
            scale,
        })
    }

    pub fn add_placement(&mut self, placement: &Placement<S::Template>) -> Result<()> {
        self.state.ensure_registering()?;

        let source = self.source;
        let sub_meshes = self
            .templates
            .get_or_insert_with(placement.template, |template| source.sub_meshes(template));

        let placement_matrix = placement.matrix();
        for sub_mesh in sub_meshes.iter() {
            self.buffers
                .entry(sub_mesh.material.clone())
                .or_default()
                .add(sub_mesh.mesh.clone(), placement_matrix * sub_mesh.local_matrix);
        }

        Ok(())
    }

    pub fn material_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer(&self, material: &S::Material) -> Option<&MeshAggregationBuffer> {
        self.buffers.get(material)
    }

    /// Emits one object per material, named after the material, holding every
    /// mesh registered with it.
    pub fn finalize<O>(&mut self, anchor: O::Handle, output: &mut O) -> Result<Vec<O::Handle>>
    where
        O: BatchOutput<Material = S::Material>,
    {
        let buffers = self.take_buffers()?;
        let mut objects = Vec::with_capacity(buffers.len());
        let mut total_vertices = 0;

        for (material, buffer) in buffers {
            if buffer.is_empty() {
                continue;
            }

            let name = self.source.material_name(&material);
            let mut mesh = buffer.combine();
            mesh.name = name.clone();
            total_vertices += mesh.vertex_count();

            log::debug!(
                "Merged {} meshes into {} ({} vertices)",
                buffer.entry_count(),
                name,
                mesh.vertex_count()
            );
            objects.push(output.create_mesh_object(&name, anchor, mesh, material));
        }

        log::info!(
            "Created {} batched meshes with {} vertices",
            objects.len(),
            total_vertices
        );

        Ok(objects)
    }

    /// Emits each material as several objects of about `vertex_budget` vertices,
    /// named `{material}{group}`.
    ///
    /// Entries are first sorted by `compare` over their translations, then grouped
    /// greedily: a group closes once its vertex count reaches the budget. A single
    /// mesh larger than the budget forms a group of its own.
    ///
    /// A zero budget fails with [`BatchError::InvalidVertexBudget`] and leaves the
    /// batcher registering.
    pub fn finalize_with_budget<O>(
        &mut self,
        anchor: O::Handle,
        output: &mut O,
        vertex_budget: usize,
        mut compare: impl FnMut(Vec3, Vec3) -> Ordering,
    ) -> Result<Vec<O::Handle>>
    where
        O: BatchOutput<Material = S::Material>,
    {
        self.state.ensure_registering()?;
        if vertex_budget == 0 {
            return Err(BatchError::InvalidVertexBudget(vertex_budget));
        }

        let buffers = self.take_buffers()?;
        let mut objects = Vec::new();
        let mut total_vertices = 0;

        for (material, mut buffer) in buffers {
            if buffer.is_empty() {
                continue;
            }

            buffer.sort_by(&mut compare);
            let material_name = self.source.material_name(&material);
            log::debug!(
                "Grouping {} entries of {} ({} vertices)",
                buffer.entry_count(),
                material_name,
                buffer.total_vertex_count()
            );

            let vertex_counts = buffer
                .entries()
                .iter()
                .map(|entry| entry.mesh.vertex_count());
            let groups = vertex_budget_groups(vertex_counts, vertex_budget);

            for (group_index, group) in groups.into_iter().enumerate() {
                let name = format!("{material_name}{group_index}");
                let mut mesh = buffer.combine_range(group.start, group.len())?;
                mesh.name = name.clone();
                total_vertices += mesh.vertex_count();

                log::debug!(
                    "Merged entries {:?} into {} ({} vertices)",
                    group,
                    name,
                    mesh.vertex_count()
                );
                objects.push(output.create_mesh_object(&name, anchor, mesh, material.clone()));
            }
        }

        log::info!(
            "Created {} batched meshes with {} vertices (budget {})",
            objects.len(),
            total_vertices,
            vertex_budget
        );

        Ok(objects)
    }

    /// Picks [`finalize`](Self::finalize) or
    /// [`finalize_with_budget`](Self::finalize_with_budget) from `config`.
    pub fn finalize_with_config<O>(
        &mut self,
        anchor: O::Handle,
        output: &mut O,
        config: &BatchConfig,
        compare: impl FnMut(Vec3, Vec3) -> Ordering,
    ) -> Result<Vec<O::Handle>>
    where
        O: BatchOutput<Material = S::Material>,
    {
        match config.vertex_budget {
            Some(budget) => self.finalize_with_budget(anchor, output, budget, compare),
            None => self.finalize(anchor, output),
        }
    }

    fn take_buffers(&mut self) -> Result<BTreeMap<S::Material, MeshAggregationBuffer>> {
        self.state.ensure_registering()?;
        self.state = BatcherState::Finalized;
        self.templates.clear();
        Ok(std::mem::take(&mut self.buffers))
    }
}

/// Splits a sequence of vertex counts into contiguous groups.
///
/// Counts accumulate until the running total reaches `vertex_budget`, which closes
/// the group at that entry. The last entry always closes the final group.
pub fn vertex_budget_groups(
    vertex_counts: impl IntoIterator<Item = usize>,
    vertex_budget: usize,
) -> Vec<Range<usize>> {
    let vertex_counts: Vec<usize> = vertex_counts.into_iter().collect();
    let last = vertex_counts.len().saturating_sub(1);

    let mut groups = Vec::new();
    let mut start = 0;
    let mut running = 0;

    for (i, count) in vertex_counts.into_iter().enumerate() {
        running += count;
        if running >= vertex_budget || i == last {
            groups.push(start..i + 1);
            start = i + 1;
            running = 0;
        }
    }

    groups
}
