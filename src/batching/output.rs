use std::fmt::Debug;

use crate::model::Mesh;
use crate::scene_graph::collider::ColliderShape;

/// Host-side creation of the objects batching produces.
///
/// Created objects sit at their parent's origin with no rotation or scale;
/// placements are already baked into the mesh vertices and collider shapes.
pub trait BatchOutput {
    type Handle: Copy + Debug;
    type Material;

    fn create_mesh_object(
        &mut self,
        name: &str,
        parent: Self::Handle,
        mesh: Mesh,
        material: Self::Material,
    ) -> Self::Handle;

    /// An empty object used to group other outputs.
    fn create_group_object(&mut self, name: &str, parent: Self::Handle) -> Self::Handle;

    fn create_collider_object(&mut self, parent: Self::Handle, shape: ColliderShape)
        -> Self::Handle;
}
