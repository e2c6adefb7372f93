use std::sync::Arc;

use anyhow::Context;
use glam::{Quat, Vec3};
use rand::Rng;

use prefab_batcher::asset_pipeline::materials::MaterialData;
use prefab_batcher::asset_pipeline::mesh_baker::bake_meshes;
use prefab_batcher::batching::{ordering, BatchConfig, ColliderBatcher, MeshBatcher, Placement};
use prefab_batcher::model::cube_mesh;
use prefab_batcher::scene_graph::{Collider, Object3D, ObjectId, PrefabLibrary, Scene, Transform};

const PLACEMENT_COUNT: usize = 10;

pub struct DemoState {
    library: PrefabLibrary,
    template: ObjectId,
    config: BatchConfig,
    pub world: Scene,
    anchor: ObjectId,
}

impl DemoState {
    pub fn new(template_path: Option<&str>, config_path: Option<&str>) -> anyhow::Result<Self> {
        let mut library = PrefabLibrary::new();

        let template = match template_path {
            Some(path) => *library
                .load_gltf(path)?
                .first()
                .with_context(|| format!("No templates in {}", path))?,
            None => build_crate_template(&mut library),
        };

        let config = match config_path {
            Some(path) => BatchConfig::from_json_file(path)?,
            None => BatchConfig {
                vertex_budget: Some(150),
                ..BatchConfig::default()
            },
        };

        let mut world = Scene::new();
        let anchor = world.add_object(Object3D::new("Batched"));

        Ok(Self {
            library,
            template,
            config,
            world,
            anchor,
        })
    }

    pub fn placements(&self) -> Vec<Placement<ObjectId>> {
        let mut rng = rand::thread_rng();

        (0..PLACEMENT_COUNT)
            .map(|i| {
                let position = Vec3::new(i as f32 * 4.0, 0.0, 10.0);
                let rotation = Quat::from_axis_angle(Vec3::Y, rng.gen_range(0.0..std::f32::consts::TAU));
                let scale = Vec3::ONE + Vec3::Y * i as f32 * 0.2;
                Placement::new(self.template, position, rotation).with_scale(scale)
            })
            .collect()
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let placements = self.placements();

        let mut meshes = MeshBatcher::new(&self.library);
        let mut colliders = ColliderBatcher::new(&self.library)
            .strict_shapes(self.config.strict_collider_shapes)
            .anchor_name(self.config.collider_anchor_name.clone());

        for placement in &placements {
            meshes.add_placement(placement)?;
            colliders.add_placement(*placement)?;
        }

        let mesh_objects = meshes.finalize_with_config(
            self.anchor,
            &mut self.world,
            &self.config,
            ordering::by_descending_height_then_x,
        )?;
        let collider_outcome = colliders.finalize(self.anchor, &mut self.world)?;

        let batched = mesh_objects
            .iter()
            .filter_map(|&id| self.world.get_object(id))
            .filter_map(|object| object.renderer.as_ref())
            .map(|renderer| renderer.mesh.as_ref())
            .collect::<Vec<_>>();
        let baked = bake_meshes(&batched);

        for (id, info) in mesh_objects.iter().zip(&baked.meshes) {
            if let Some(object) = self.world.get_object(*id) {
                log::info!(
                    "{}: {} indices from vertex {}",
                    object.name,
                    info.index_count,
                    info.vertex_offset
                );
            }
        }

        log::info!(
            "{} placements -> {} meshes ({} vertices), {} colliders ({} unsupported)",
            placements.len(),
            mesh_objects.len(),
            baked.buffers.vertices.len(),
            collider_outcome.colliders.len(),
            collider_outcome.unsupported.len()
        );

        Ok(())
    }
}

/// A crate: a box body, a lid with its own material, a sphere collider and a
/// box collider the batcher can't merge.
fn build_crate_template(library: &mut PrefabLibrary) -> ObjectId {
    let wood = library.materials.add_material(MaterialData::new("Wood"));
    let metal = library.materials.add_material(MaterialData::new("Metal"));

    let root = library.add_template(
        Object3D::new("Crate")
            .with_collider(Collider::sphere(Vec3::new(0.0, 0.5, 0.0), 0.75))
            .with_collider(Collider::cuboid(Vec3::new(0.0, 0.5, 0.0), Vec3::ONE)),
    );
    library.add_template_part(
        root,
        Object3D::new("Body")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)))
            .with_renderer(Arc::new(cube_mesh("Body", 0.5)), wood),
    );
    library.add_template_part(
        root,
        Object3D::new("Lid")
            .with_transform(Transform::new(
                Vec3::new(0.0, 1.05, 0.0),
                Quat::IDENTITY,
                Vec3::new(1.1, 0.1, 1.1),
            ))
            .with_renderer(Arc::new(cube_mesh("Lid", 0.5)), metal),
    );

    root
}
