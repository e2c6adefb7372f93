use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::model::Mesh;
use crate::scene_graph::collider::ColliderShape;

/// One renderable piece of a template, in template space.
#[derive(Debug, Clone)]
pub struct SubMesh<M> {
    pub mesh: Arc<Mesh>,
    pub material: M,
    pub local_matrix: Mat4,
}

/// A collider of a template, with its transform decomposed in template space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderPrimitive {
    pub shape: ColliderShape,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub is_trigger: bool,
}

/// Host-side access to template geometry.
///
/// Both lookups must return the same result for the same template within one
/// batching session; batchers query each template at most once.
pub trait GeometrySource {
    type Template: Copy + Eq + Hash + Debug;
    type Material: Clone + Ord + Debug;

    fn sub_meshes(&self, template: Self::Template) -> Vec<SubMesh<Self::Material>>;

    fn collider_primitives(&self, template: Self::Template) -> Vec<ColliderPrimitive>;

    fn material_name(&self, material: &Self::Material) -> String;
}

/// Per-session cache of template lookups, filled on first use.
pub(crate) struct TemplateCache<T, V> {
    entries: HashMap<T, Arc<[V]>>,
}

impl<T: Copy + Eq + Hash + Debug, V> TemplateCache<T, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_insert_with(&mut self, template: T, lookup: impl FnOnce(T) -> Vec<V>) -> Arc<[V]> {
        self.entries
            .entry(template)
            .or_insert_with(|| {
                let values = lookup(template);
                if values.is_empty() {
                    log::warn!("Template {:?} has nothing to batch", template);
                } else {
                    log::debug!("Cached {} entries for template {:?}", values.len(), template);
                }
                values.into()
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
