use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere radii can't represent non-uniform scale, so the largest axis wins.
    pub fn scaled(&self, scale: Vec3) -> BoundingSphere {
        BoundingSphere {
            center: self.center,
            radius: self.radius * scale.max_element(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Aabb> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Aabb::new(first, first), |aabb, point| Aabb {
            min: aabb.min.min(point),
            max: aabb.max.max(point),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_no_points_is_none() {
        assert_eq!(Aabb::from_points(std::iter::empty()), None);
    }

    #[test]
    fn aabb_from_points_covers_all_points() {
        let points = [
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.5),
            Vec3::new(0.0, 0.0, -6.0),
        ];
        let aabb = Aabb::from_points(points).unwrap();

        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -6.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn sphere_scale_uses_largest_axis() {
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 2.0,
        };

        assert_eq!(sphere.scaled(Vec3::new(1.0, 3.0, 0.5)).radius, 6.0);
    }
}
