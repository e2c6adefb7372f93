pub mod collider;
pub mod object3d;
pub mod prefab_library;
pub mod scene;
pub mod transform;

// Re-export main types for convenience
pub use collider::{Collider, ColliderShape, ShapeKind};
pub use object3d::{MeshRenderer, Object3D, ObjectId};
pub use prefab_library::PrefabLibrary;
pub use scene::Scene;
pub use transform::Transform;
