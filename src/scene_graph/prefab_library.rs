use std::path::Path;

use anyhow::Context;

use crate::batching::{ColliderPrimitive, GeometrySource, SubMesh};
use crate::material_manager::{MaterialId, MaterialManager};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

/// Templates kept in their own scene, each one a root object and its subtree.
pub struct PrefabLibrary {
    pub scene: Scene,
    pub materials: MaterialManager,
    templates: Vec<ObjectId>,
}

impl PrefabLibrary {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            materials: MaterialManager::new(),
            templates: Vec::new(),
        }
    }

    /// Imports a glTF file, making each root node a template.
    pub fn load_gltf(&mut self, path: impl AsRef<Path>) -> anyhow::Result<Vec<ObjectId>> {
        let path = path.as_ref();
        let file_name = path.to_string_lossy().to_string();

        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to import {}", file_name))?;
        let gltf_scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .context("No scenes in gltf")?;

        self.materials
            .load_all_materials_from_gltf(&file_name, &document);
        let roots =
            self.scene
                .spawn_gltf_scene(&mut self.materials, &file_name, &buffers, &gltf_scene)?;

        log::info!("Loaded {} templates from {}", roots.len(), file_name);
        self.templates.extend(roots.iter().copied());

        Ok(roots)
    }

    /// Adds a template built in code.
    pub fn add_template(&mut self, root: Object3D) -> ObjectId {
        let id = self.scene.add_object(root);
        self.templates.push(id);
        id
    }

    pub fn add_template_part(&mut self, template: ObjectId, part: Object3D) -> ObjectId {
        self.scene.add_child(template, part)
    }

    pub fn templates(&self) -> &[ObjectId] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<ObjectId> {
        self.templates
            .iter()
            .copied()
            .find(|&id| self.scene.get_object(id).is_some_and(|o| o.name == name))
    }
}

impl Default for PrefabLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometrySource for PrefabLibrary {
    type Template = ObjectId;
    type Material = MaterialId;

    fn sub_meshes(&self, template: ObjectId) -> Vec<SubMesh<MaterialId>> {
        self.scene
            .descendants(template)
            .into_iter()
            .filter_map(|id| {
                let renderer = self.scene.get_object(id)?.renderer.as_ref()?;
                Some(SubMesh {
                    mesh: renderer.mesh.clone(),
                    material: renderer.material,
                    local_matrix: self.scene.relative_matrix(template, id),
                })
            })
            .collect()
    }

    fn collider_primitives(&self, template: ObjectId) -> Vec<ColliderPrimitive> {
        let mut primitives = Vec::new();

        for id in self.scene.descendants(template) {
            let Some(object) = self.scene.get_object(id) else {
                continue;
            };
            if object.colliders.is_empty() {
                continue;
            }

            let local = Transform::from_matrix(&self.scene.relative_matrix(template, id));
            primitives.extend(object.colliders.iter().map(|collider| ColliderPrimitive {
                shape: collider.shape,
                position: local.translation,
                rotation: local.rotation,
                scale: local.scale,
                is_trigger: collider.is_trigger,
            }));
        }

        primitives
    }

    fn material_name(&self, material: &MaterialId) -> String {
        self.materials.name(*material).to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Quat, Vec3};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::asset_pipeline::materials::MaterialData;
    use crate::model::cube_mesh;
    use crate::scene_graph::collider::Collider;

    #[test]
    fn sub_meshes_are_relative_to_template_root() {
        let mut library = PrefabLibrary::new();
        let material = library.materials.add_material(MaterialData::new("Bark"));
        let cube = Arc::new(cube_mesh("cube", 0.5));

        let root = library.add_template(
            Object3D::new("tree")
                .with_transform(Transform::from_translation(Vec3::new(100.0, 0.0, 0.0))),
        );
        library.add_template_part(
            root,
            Object3D::new("trunk")
                .with_transform(Transform::from_translation(Vec3::Y))
                .with_renderer(cube, material),
        );

        let sub_meshes = library.sub_meshes(root);

        assert_eq!(sub_meshes.len(), 1);
        assert_eq!(sub_meshes[0].material, material);
        assert_eq!(sub_meshes[0].local_matrix.w_axis.truncate(), Vec3::Y);
        assert_eq!(library.material_name(&material), "Bark");
        assert_eq!(library.template("tree"), Some(root));
        assert_eq!(library.template("rock"), None);
    }

    #[test]
    fn collider_primitives_carry_decomposed_transform() {
        let mut library = PrefabLibrary::new();
        let root = library.add_template(Object3D::new("crate"));
        library.add_template_part(
            root,
            Object3D::new("shell")
                .with_transform(Transform::new(
                    Vec3::new(0.0, 2.0, 0.0),
                    Quat::IDENTITY,
                    Vec3::new(1.0, 3.0, 1.0),
                ))
                .with_collider(Collider::sphere(Vec3::ZERO, 0.5))
                .with_collider(Collider::sphere(Vec3::ZERO, 1.0).trigger()),
        );

        let primitives = library.collider_primitives(root);

        assert_eq!(primitives.len(), 2);
        assert!(primitives[0].position.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
        assert!(primitives[0].scale.abs_diff_eq(Vec3::new(1.0, 3.0, 1.0), 1e-5));
        assert!(!primitives[0].is_trigger);
        assert!(primitives[1].is_trigger);
    }

    #[test]
    fn template_without_geometry_is_empty() {
        let mut library = PrefabLibrary::new();
        let root = library.add_template(Object3D::new("empty"));

        assert!(library.sub_meshes(root).is_empty());
        assert!(library.collider_primitives(root).is_empty());
    }
}
