use glam::{Quat, Vec3};

use crate::batching::geometry_source::{ColliderPrimitive, GeometrySource, TemplateCache};
use crate::batching::output::BatchOutput;
use crate::batching::placement::Placement;
use crate::batching::BatcherState;
use crate::error::{BatchError, Result};
use crate::math::BoundingSphere;
use crate::scene_graph::collider::{ColliderShape, ShapeKind};

/// A collider that was left out of the batched result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCollider {
    pub template: String,
    pub shape: ShapeKind,
}

#[derive(Debug)]
pub struct ColliderBatchOutcome<H> {
    /// The identity-transform object holding every emitted collider, if any were.
    pub anchor: Option<H>,
    pub colliders: Vec<H>,
    pub unsupported: Vec<UnsupportedCollider>,
    pub skipped_triggers: usize,
}

/// Re-creates the colliders of placed templates as world-space colliders.
///
/// Only spheres are approximated. Box and capsule colliders are skipped and
/// reported in [`ColliderBatchOutcome::unsupported`], or rejected outright when
/// built with [`strict_shapes`](Self::strict_shapes). Triggers are never emitted.
pub struct ColliderBatcher<'a, S: GeometrySource> {
    source: &'a S,
    state: BatcherState,
    templates: TemplateCache<S::Template, ColliderPrimitive>,
    placements: Vec<Placement<S::Template>>,
    strict_shapes: bool,
    anchor_name: String,
}

impl<'a, S: GeometrySource> ColliderBatcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            state: BatcherState::Registering,
            templates: TemplateCache::new(),
            placements: Vec::new(),
            strict_shapes: false,
            anchor_name: "Colliders".to_string(),
        }
    }

    pub fn strict_shapes(mut self, strict: bool) -> Self {
        self.strict_shapes = strict;
        self
    }

    pub fn anchor_name(mut self, name: impl Into<String>) -> Self {
        self.anchor_name = name.into();
        self
    }

    pub fn state(&self) -> BatcherState {
        self.state
    }

    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Records a placement. Collider lookups are deferred to finalize.
    pub fn add(
        &mut self,
        template: S::Template,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Result<()> {
        self.add_placement(Placement {
            template,
            position,
            rotation,
            scale,
        })
    }

    pub fn add_placement(&mut self, placement: Placement<S::Template>) -> Result<()> {
        self.state.ensure_registering()?;
        self.placements.push(placement);
        Ok(())
    }

    /// Emits every approximated collider under one identity-transform object
    /// parented to `anchor`. That object is only created when there is at least
    /// one collider to hold.
    ///
    /// In strict mode an unsupported shape fails before anything is emitted and
    /// the batcher stays registering.
    pub fn finalize<O>(
        &mut self,
        anchor: O::Handle,
        output: &mut O,
    ) -> Result<ColliderBatchOutcome<O::Handle>>
    where
        O: BatchOutput,
    {
        self.state.ensure_registering()?;

        let mut shapes = Vec::new();
        let mut unsupported = Vec::new();
        let mut skipped_triggers = 0;

        for placement in &self.placements {
            let source = self.source;
            let primitives = self
                .templates
                .get_or_insert_with(placement.template, |template| {
                    source.collider_primitives(template)
                });

            for primitive in primitives.iter() {
                if primitive.is_trigger {
                    skipped_triggers += 1;
                    continue;
                }

                match approximate(placement, primitive) {
                    Some(shape) => shapes.push(shape),
                    None if self.strict_shapes => {
                        return Err(BatchError::UnsupportedShape {
                            template: format!("{:?}", placement.template),
                            shape: primitive.shape.kind(),
                        });
                    }
                    None => {
                        log::warn!(
                            "Skipping {:?} collider of template {:?}, only spheres can be batched",
                            primitive.shape.kind(),
                            placement.template
                        );
                        unsupported.push(UnsupportedCollider {
                            template: format!("{:?}", placement.template),
                            shape: primitive.shape.kind(),
                        });
                    }
                }
            }
        }

        self.state = BatcherState::Finalized;
        self.placements.clear();
        self.templates.clear();

        let collider_anchor = if shapes.is_empty() {
            None
        } else {
            Some(output.create_group_object(&self.anchor_name, anchor))
        };

        let colliders = match collider_anchor {
            Some(parent) => shapes
                .into_iter()
                .map(|shape| output.create_collider_object(parent, shape))
                .collect(),
            None => Vec::new(),
        };

        log::info!(
            "Created {} batched colliders ({} unsupported, {} triggers skipped)",
            colliders.len(),
            unsupported.len(),
            skipped_triggers
        );

        Ok(ColliderBatchOutcome {
            anchor: collider_anchor,
            colliders,
            unsupported,
            skipped_triggers,
        })
    }
}

/// World-space approximation of `primitive` under `placement`, or `None` for
/// shapes that have no approximation.
pub fn approximate<T>(placement: &Placement<T>, primitive: &ColliderPrimitive) -> Option<ColliderShape> {
    match primitive.shape {
        ColliderShape::Sphere { center, radius } => {
            let sphere = BoundingSphere { center, radius }.scaled(primitive.scale * placement.scale);

            let center = placement.position
                + placement.rotation * (primitive.position * placement.scale)
                + placement.rotation * primitive.rotation * sphere.center;

            Some(ColliderShape::Sphere {
                center,
                radius: sphere.radius,
            })
        }
        ColliderShape::Box { .. } | ColliderShape::Capsule { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sphere_primitive(position: Vec3, scale: Vec3, center: Vec3, radius: f32) -> ColliderPrimitive {
        ColliderPrimitive {
            shape: ColliderShape::Sphere { center, radius },
            position,
            rotation: Quat::IDENTITY,
            scale,
            is_trigger: false,
        }
    }

    fn sphere_parts(shape: ColliderShape) -> (Vec3, f32) {
        match shape {
            ColliderShape::Sphere { center, radius } => (center, radius),
            other => panic!("expected a sphere, got {other:?}"),
        }
    }

    #[rstest]
    #[case(Vec3::ONE, Vec3::ONE, 1.0)]
    #[case(Vec3::new(1.0, 2.0, 1.0), Vec3::ONE, 2.0)]
    #[case(Vec3::new(2.0, 1.0, 1.0), Vec3::new(1.0, 3.0, 1.0), 3.0)]
    #[case(Vec3::new(0.5, 4.0, 1.0), Vec3::new(4.0, 0.5, 3.0), 3.0)]
    fn radius_scales_by_largest_combined_axis(
        #[case] local_scale: Vec3,
        #[case] placement_scale: Vec3,
        #[case] expected_factor: f32,
    ) {
        let primitive = sphere_primitive(Vec3::ZERO, local_scale, Vec3::ZERO, 0.5);
        let placement = Placement::new(0u32, Vec3::ZERO, Quat::IDENTITY).with_scale(placement_scale);

        let (_, radius) = sphere_parts(approximate(&placement, &primitive).unwrap());

        assert!((radius - 0.5 * expected_factor).abs() < 1e-6, "{radius}");
    }

    #[test]
    fn center_combines_placement_and_local_offsets() {
        let primitive = sphere_primitive(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::ONE,
            Vec3::new(0.0, 0.5, 0.0),
            1.0,
        );
        let placement = Placement::new(
            0u32,
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        )
        .with_scale(Vec3::splat(2.0));

        let (center, _) = sphere_parts(approximate(&placement, &primitive).unwrap());

        // Local offset (1, 0, 0) * 2 rotated to (0, 2, 0); sphere center (0, 0.5, 0)
        // rotated to (-0.5, 0, 0).
        assert!(
            center.abs_diff_eq(Vec3::new(9.5, 2.0, 0.0), 1e-5),
            "{center:?}"
        );
    }

    #[test]
    fn boxes_and_capsules_have_no_approximation() {
        let placement = Placement::new(0u32, Vec3::ZERO, Quat::IDENTITY);
        let mut primitive = sphere_primitive(Vec3::ZERO, Vec3::ONE, Vec3::ZERO, 1.0);

        primitive.shape = ColliderShape::Box {
            center: Vec3::ZERO,
            size: Vec3::ONE,
        };
        assert_eq!(approximate(&placement, &primitive), None);

        primitive.shape = ColliderShape::Capsule {
            center: Vec3::ZERO,
            radius: 0.5,
            height: 2.0,
            direction: Default::default(),
        };
        assert_eq!(approximate(&placement, &primitive), None);
    }
}
