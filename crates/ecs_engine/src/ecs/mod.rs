//! Entity-Component core
//!
//! Entities own at most one component per [`ComponentKind`]. The
//! [`Registry`] stores them in creation order, indexes them by kind and
//! drives lifecycle transitions; the [`FrameScheduler`] runs the per-frame
//! update and render passes over it.

pub mod commands;
pub mod component;
pub mod components;
pub mod entity;
pub mod inspect;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use commands::{CommandQueue, DeferredCommand};
pub use component::{Component, ComponentKind, ComponentType};
pub use components::{
    Behaviour, BehaviourComponent, CameraComponent, CameraMovement, DrawOutcome, MeshComponent, RendererComponent,
    TransformComponent,
};
pub use entity::{Entity, EntityId};
pub use inspect::{ComponentReport, EntityReport, Inspect, Property, PropertyValue};
pub use lifecycle::{ComponentSlot, HookContext, Lifecycle, LifecycleState};
pub use registry::{Registry, RegistryError, RegistryResult};
pub use scheduler::{FrameScheduler, FrameStats, FrameView};
