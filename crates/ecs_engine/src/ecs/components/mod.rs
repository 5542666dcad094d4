//! Built-in component types

pub mod behaviour;
pub mod camera;
pub mod mesh;
pub mod renderer;
pub mod transform;

pub use behaviour::{Behaviour, BehaviourComponent};
pub use camera::{CameraComponent, CameraMovement};
pub use mesh::MeshComponent;
pub use renderer::{DrawOutcome, RendererComponent};
pub use transform::TransformComponent;
