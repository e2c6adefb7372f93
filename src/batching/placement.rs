use glam::{Mat4, Quat, Vec3};

/// One instance of a template in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<T> {
    pub template: T,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl<T> Placement<T> {
    pub fn new(template: T, position: Vec3, rotation: Quat) -> Self {
        Self {
            template,
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(self, scale: Vec3) -> Self {
        Self { scale, ..self }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
