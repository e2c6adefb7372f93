use std::sync::Arc;

use id_arena::Id;

use crate::material_manager::MaterialId;
use crate::model::Mesh;
use crate::scene_graph::collider::Collider;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: Arc<Mesh>,
    pub material: MaterialId,
}

#[derive(Debug, Default)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub renderer: Option<MeshRenderer>,
    pub colliders: Vec<Collider>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_renderer(mut self, mesh: Arc<Mesh>, material: MaterialId) -> Self {
        self.renderer = Some(MeshRenderer { mesh, material });
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn parent<'a>(&self, scene: &'a Scene) -> Option<&'a Object3D> {
        self.parent_id.and_then(|id| scene.get_object(id))
    }

    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}
