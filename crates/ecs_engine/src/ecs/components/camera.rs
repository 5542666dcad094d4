//! # Fly Camera Component
//!
//! A free-flying perspective camera steered by discrete movement events and
//! pointer deltas. Orientation is kept as yaw/pitch angles; the `front`
//! vector is derived from them after every rotation.
//!
//! ## Coordinate System
//! Right-handed, Y-up. With yaw 90 degrees and pitch 0 the camera looks
//! down +Z.

use crate::core::config::CameraConfig;
use crate::ecs::inspect::{Inspect, Property, PropertyValue};
use crate::ecs::lifecycle::Lifecycle;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Pitch limit in degrees, keeps the view from flipping over the poles
const PITCH_LIMIT: f32 = 89.0;

/// Discrete movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    /// Along `front`
    Forward,
    /// Against `front`
    Backward,
    /// Against the right vector
    Left,
    /// Along the right vector
    Right,
}

impl CameraMovement {
    /// Map a WASD key to a movement, case-insensitive
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::Forward),
            's' => Some(Self::Backward),
            'a' => Some(Self::Left),
            'd' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Perspective fly camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Camera position in world space
    pub position: Vec3,

    /// Unit view direction
    pub front: Vec3,

    /// World up vector
    pub up: Vec3,

    /// Heading in degrees
    pub yaw: f32,

    /// Elevation in degrees, within +-89
    pub pitch: f32,

    /// World units per movement event
    pub movement_speed: f32,

    /// Degrees per unit of pointer delta
    pub mouse_sensitivity: f32,

    /// Vertical field of view in degrees
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self::new(Vec3::zeros(), &CameraConfig::default(), 1.0)
    }
}

impl CameraComponent {
    /// Create a camera at `position` looking down +Z
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `config` - Field of view, clipping planes and input speeds
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    pub fn new(position: Vec3, config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::z(),
            up: Vec3::y(),
            yaw: 90.0,
            pitch: 0.0,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            fov: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
        };
        camera.update_front();
        camera
    }

    /// Move one step of `movement_speed` in `direction`
    pub fn move_in(&mut self, direction: CameraMovement) {
        let step = match direction {
            CameraMovement::Forward => self.front * self.movement_speed,
            CameraMovement::Backward => -self.front * self.movement_speed,
            CameraMovement::Left => -self.right() * self.movement_speed,
            CameraMovement::Right => self.right() * self.movement_speed,
        };
        self.position += step;
        log::trace!("Camera moved {:?} to {:?}", direction, self.position);
    }

    /// Apply a pointer delta
    ///
    /// Positive `dx` turns right. Positive `dy` looks down, matching screen
    /// coordinates where y grows downwards.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch - dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_front();
        log::trace!("Camera rotated to yaw {:.2}, pitch {:.2}", self.yaw, self.pitch);
    }

    /// Turn towards `target`, deriving yaw and pitch from the new direction
    pub fn look_at(&mut self, target: Vec3) {
        let Some(direction) = (target - self.position).try_normalize(f32::EPSILON) else {
            return;
        };
        self.yaw = utils::rad_to_deg(direction.z.atan2(direction.x));
        self.pitch = utils::rad_to_deg(direction.y.asin()).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_front();
    }

    /// Update camera aspect ratio for viewport changes
    ///
    /// Only logs changes above 0.01 to keep resize storms quiet.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// Unit vector to the camera's right
    pub fn right(&self) -> Vec3 {
        self.front.cross(&self.up).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::x)
    }

    /// World-to-camera transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov), self.aspect, self.near, self.far)
    }

    fn update_front(&mut self) {
        let (yaw, pitch) = (utils::deg_to_rad(self.yaw), utils::deg_to_rad(self.pitch));
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = front.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
    }
}

impl Lifecycle for CameraComponent {}

impl Inspect for CameraComponent {
    fn properties(&self) -> Vec<Property> {
        vec![
            Property::new("position", PropertyValue::Vec3(self.position)),
            Property::new("front", PropertyValue::Vec3(self.front)),
            Property::new("yaw", PropertyValue::Float(self.yaw)),
            Property::new("pitch", PropertyValue::Float(self.pitch)),
            Property::new("fov", PropertyValue::Float(self.fov)),
            Property::new("aspect", PropertyValue::Float(self.aspect)),
            Property::new("near", PropertyValue::Float(self.near)),
            Property::new("far", PropertyValue::Float(self.far)),
        ]
    }
}
