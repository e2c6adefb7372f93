use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use glam::{Mat4, Quat};
use id_arena::Arena;

use crate::batching::BatchOutput;
use crate::material_manager::{MaterialId, MaterialManager};
use crate::model::{Buffers, Mesh};
use crate::scene_graph::collider::{colliders_from_extras, Collider, ColliderShape};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    gltf_mesh_cache: HashMap<(String, usize), Vec<(Arc<Mesh>, MaterialId)>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            gltf_mesh_cache: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds `object` as the last child of `parent`.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let id = self.add_object(object);
        self.set_object_parent(id, Some(parent));
        id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn root_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id)
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        // Remove from old parent's children list
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }
    }

    /// `root` and everything below it, parents before children.
    pub fn descendants(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            result.push(id);
            stack.extend(object.child_ids.iter().rev());
        }

        result
    }

    pub fn world_matrix(&self, id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.objects.get(id);

        while let Some(object) = current {
            matrix = object.transform.local_matrix() * matrix;
            current = object.parent(self);
        }

        matrix
    }

    /// Transform of `id` in the space of `root`, not including `root`'s own
    /// transform. Falls back to the world matrix if `id` is not below `root`.
    pub fn relative_matrix(&self, root: ObjectId, id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = id;

        while current != root {
            let Some(object) = self.objects.get(current) else {
                break;
            };
            matrix = object.transform.local_matrix() * matrix;
            match object.parent_id {
                Some(parent) => current = parent,
                None => return matrix,
            }
        }

        matrix
    }

    /// Spawns every root node of `scene` and returns the spawned roots.
    pub fn spawn_gltf_scene(
        &mut self,
        materials: &mut MaterialManager,
        file_name: &str,
        buffers: Buffers,
        scene: &gltf::Scene,
    ) -> anyhow::Result<Vec<ObjectId>> {
        scene
            .nodes()
            .map(|node| self.spawn_gltf_node(materials, file_name, buffers, &node, None))
            .collect()
    }

    fn spawn_gltf_node(
        &mut self,
        materials: &mut MaterialManager,
        file_name: &str,
        buffers: Buffers,
        node: &gltf::Node,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let (translation, rotation, scale) = node.transform().decomposed();

        let mut object = Object3D::new(node_name.clone()).with_transform(Transform::new(
            translation.into(),
            Quat::from_array(rotation),
            scale.into(),
        ));

        if let Some(extras) = node.extras() {
            object.colliders = colliders_from_extras(extras.get())
                .with_context(|| format!("Invalid collider extras on node {}", node_name))?;
        }

        let primitives = match node.mesh() {
            Some(mesh) => self.load_gltf_mesh(materials, file_name, buffers, &mesh, &node_name)?,
            None => Vec::new(),
        };

        // A single primitive renders on the node itself; several get one child each.
        let mut extra_primitives = Vec::new();
        if primitives.len() == 1 {
            let (mesh, material) = primitives[0].clone();
            object = object.with_renderer(mesh, material);
        } else {
            extra_primitives = primitives;
        }

        let object_id = self.add_object(object);
        if let Some(parent_id) = parent {
            self.set_object_parent(object_id, Some(parent_id));
        }

        for (mesh, material) in extra_primitives {
            let child = Object3D::new(mesh.name.clone()).with_renderer(mesh, material);
            self.add_child(object_id, child);
        }

        for child in node.children() {
            self.spawn_gltf_node(materials, file_name, buffers, &child, Some(object_id))?;
        }

        Ok(object_id)
    }

    fn load_gltf_mesh(
        &mut self,
        materials: &mut MaterialManager,
        file_name: &str,
        buffers: Buffers,
        mesh: &gltf::Mesh,
        node_name: &str,
    ) -> anyhow::Result<Vec<(Arc<Mesh>, MaterialId)>> {
        let key = (file_name.to_string(), mesh.index());
        if let Some(primitives) = self.gltf_mesh_cache.get(&key) {
            return Ok(primitives.clone());
        }

        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("{} (Mesh)", node_name));

        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            let name = format!("{} (primitive {})", mesh_name, primitive.index());
            let loaded = Mesh::from_gltf_primitive(name, &primitive, buffers)?;
            let material = materials.material_for_primitive(file_name, &primitive);
            primitives.push((Arc::new(loaded), material));
        }

        if primitives.is_empty() {
            anyhow::bail!("Mesh without primitives: {}", mesh_name);
        }

        self.gltf_mesh_cache.insert(key, primitives.clone());
        Ok(primitives)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOutput for Scene {
    type Handle = ObjectId;
    type Material = MaterialId;

    fn create_mesh_object(
        &mut self,
        name: &str,
        parent: ObjectId,
        mesh: Mesh,
        material: MaterialId,
    ) -> ObjectId {
        let object = Object3D::new(name).with_renderer(Arc::new(mesh), material);
        self.add_child(parent, object)
    }

    fn create_group_object(&mut self, name: &str, parent: ObjectId) -> ObjectId {
        self.add_child(parent, Object3D::new(name))
    }

    fn create_collider_object(&mut self, parent: ObjectId, shape: ColliderShape) -> ObjectId {
        let name = format!("{:?} collider", shape.kind());
        let object = Object3D::new(name).with_collider(Collider {
            shape,
            is_trigger: false,
        });
        self.add_child(parent, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_pipeline::materials::MaterialData;
    use crate::model::cube_mesh;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    fn offset(x: f32) -> Transform {
        Transform::from_translation(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn world_matrix_accumulates_parents() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::new("root").with_transform(offset(1.0)));
        let child = scene.add_child(root, Object3D::new("child").with_transform(offset(2.0)));
        let grandchild =
            scene.add_child(child, Object3D::new("grandchild").with_transform(offset(4.0)));

        assert_eq!(
            scene.world_matrix(grandchild).w_axis.truncate(),
            Vec3::new(7.0, 0.0, 0.0)
        );
        assert_eq!(
            scene.relative_matrix(root, grandchild).w_axis.truncate(),
            Vec3::new(6.0, 0.0, 0.0)
        );
        assert_eq!(scene.relative_matrix(root, root), Mat4::IDENTITY);
    }

    #[test]
    fn reparenting_moves_child_ids() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::new("a"));
        let b = scene.add_object(Object3D::new("b"));
        let child = scene.add_child(a, Object3D::new("child"));

        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
        let parent = scene.get_object(child).unwrap().parent(&scene).unwrap();
        assert_eq!(parent.name, "b");
        assert_eq!(scene.root_objects().count(), 2);
    }

    #[test]
    fn descendants_are_preorder() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::new("root"));
        let first = scene.add_child(root, Object3D::new("first"));
        let nested = scene.add_child(first, Object3D::new("nested"));
        let second = scene.add_child(root, Object3D::new("second"));

        assert_eq!(scene.descendants(root), vec![root, first, nested, second]);
        let names: Vec<&str> = scene
            .get_object(root)
            .unwrap()
            .children(&scene)
            .map(|child| child.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn output_objects_sit_at_parent_origin() {
        let mut scene = Scene::new();
        let mut materials = MaterialManager::new();
        let material = materials.add_material(MaterialData::new("Stone"));
        let anchor = scene.add_object(Object3D::new("anchor").with_transform(offset(3.0)));

        let mesh_object =
            scene.create_mesh_object("Stone", anchor, cube_mesh("cube", 1.0), material);
        let collider_object = scene.create_collider_object(
            anchor,
            ColliderShape::Sphere {
                center: Vec3::ONE,
                radius: 2.0,
            },
        );

        let object = scene.get_object(mesh_object).unwrap();
        assert_eq!(object.transform, Transform::IDENTITY);
        assert_eq!(object.parent_id, Some(anchor));
        assert_eq!(object.renderer.as_ref().unwrap().material, material);
        assert_eq!(
            scene.get_object(collider_object).unwrap().colliders,
            vec![Collider::sphere(Vec3::ONE, 2.0)]
        );
        assert_eq!(scene.get_object_by_name("Stone"), Some(mesh_object));
    }
}
