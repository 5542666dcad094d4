//! Transform component
//!
//! Pure data: position, rotation and scale in world space, Y-up right-handed.
//! The renderer reads the sibling transform's matrix at draw time.

use nalgebra::Unit;

use crate::ecs::inspect::{Inspect, Property, PropertyValue};
use crate::ecs::lifecycle::Lifecycle;
use crate::foundation::math::{utils, Mat4, Quat, Vec3};

/// Spatial placement of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// World space rotation
    pub rotation: Quat,

    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from axis-angle (radians)
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&Unit::new_normalize(axis), angle);
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Move by `offset` in world space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Apply a world-space rotation of `angle` radians about `axis`
    pub fn rotate_by(&mut self, axis: Vec3, angle: f32) {
        let Some(axis) = Unit::try_new(axis, f32::EPSILON) else {
            return;
        };
        self.rotation = Quat::from_axis_angle(&axis, angle) * self.rotation;
    }

    /// Multiply the scale component-wise
    pub fn scale_by(&mut self, factors: Vec3) {
        self.scale.component_mul_assign(&factors);
    }

    /// Model matrix, translation * rotation * scale
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

impl Lifecycle for TransformComponent {}

impl Inspect for TransformComponent {
    fn properties(&self) -> Vec<Property> {
        let (roll, pitch, yaw) = self.rotation.euler_angles();
        let euler_degrees = Vec3::new(
            utils::rad_to_deg(roll),
            utils::rad_to_deg(pitch),
            utils::rad_to_deg(yaw),
        );
        vec![
            Property::new("position", PropertyValue::Vec3(self.position)),
            Property::new("rotation_degrees", PropertyValue::Vec3(euler_degrees)),
            Property::new("scale", PropertyValue::Vec3(self.scale)),
        ]
    }
}
