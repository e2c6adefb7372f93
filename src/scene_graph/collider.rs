use glam::Vec3;
use serde::Deserialize;

/// Shape discriminant, used where the parameters don't matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Box,
    Capsule,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ColliderShape {
    Sphere {
        #[serde(default)]
        center: Vec3,
        radius: f32,
    },
    Box {
        #[serde(default)]
        center: Vec3,
        size: Vec3,
    },
    Capsule {
        #[serde(default)]
        center: Vec3,
        radius: f32,
        height: f32,
        #[serde(default)]
        direction: CapsuleAxis,
    },
}

impl ColliderShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ColliderShape::Sphere { .. } => ShapeKind::Sphere,
            ColliderShape::Box { .. } => ShapeKind::Box,
            ColliderShape::Capsule { .. } => ShapeKind::Capsule,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleAxis {
    X,
    #[default]
    Y,
    Z,
}

/// A collider attached to a scene object, in that object's local space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Collider {
    #[serde(flatten)]
    pub shape: ColliderShape,
    #[serde(default, rename = "trigger")]
    pub is_trigger: bool,
}

impl Collider {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { center, radius },
            is_trigger: false,
        }
    }

    pub fn cuboid(center: Vec3, size: Vec3) -> Self {
        Self {
            shape: ColliderShape::Box { center, size },
            is_trigger: false,
        }
    }

    pub fn trigger(self) -> Self {
        Self {
            is_trigger: true,
            ..self
        }
    }
}

#[derive(Deserialize)]
struct NodeExtras {
    #[serde(default)]
    collider: Option<Collider>,
    #[serde(default)]
    colliders: Vec<Collider>,
}

/// Reads colliders declared in a glTF node's extras, either a single
/// `"collider"` object or a `"colliders"` array.
pub fn colliders_from_extras(extras: &str) -> serde_json::Result<Vec<Collider>> {
    let extras: NodeExtras = serde_json::from_str(extras)?;
    Ok(extras.collider.into_iter().chain(extras.colliders).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sphere_from_extras() {
        let colliders =
            colliders_from_extras(r#"{"collider": {"shape": "sphere", "radius": 0.5}}"#).unwrap();

        assert_eq!(colliders, vec![Collider::sphere(Vec3::ZERO, 0.5)]);
    }

    #[test]
    fn collider_list_with_trigger() {
        let colliders = colliders_from_extras(
            r#"{"colliders": [
                {"shape": "box", "center": [0, 1, 0], "size": [1, 2, 1]},
                {"shape": "capsule", "radius": 0.25, "height": 2.0, "direction": "z", "trigger": true}
            ]}"#,
        )
        .unwrap();

        assert_eq!(colliders.len(), 2);
        assert_eq!(
            colliders[0],
            Collider::cuboid(Vec3::Y, Vec3::new(1.0, 2.0, 1.0))
        );
        assert_eq!(colliders[1].shape.kind(), ShapeKind::Capsule);
        assert!(colliders[1].is_trigger);
    }

    #[test]
    fn extras_without_colliders() {
        assert_eq!(colliders_from_extras(r#"{"author": "me"}"#).unwrap(), vec![]);
    }
}
