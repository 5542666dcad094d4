//! # ECS Engine
//!
//! A minimal entity-component scene core for real-time 3D rendering.
//!
//! ## Features
//!
//! - **Typed components**: a closed set of component kinds with O(1) typed lookup
//! - **Lifecycle hooks**: awake, enable/disable and three per-frame update phases
//! - **Resource caching**: GPU programs and vertex arrays built on enable and
//!   released on disable, keyed by mesh identity
//! - **Backend agnostic**: all GPU work goes through the `RenderBackend` trait;
//!   a headless backend is included
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecs_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let config = EngineConfig::default();
//!     ecs_engine::foundation::logging::init(&config);
//!
//!     let mut engine = Engine::new(config, HeadlessBackend::new())?;
//!     engine.create_camera("Camera", Vec3::new(0.0, 0.0, -5.0))?;
//!     engine.spawn_model("Teapot", Model::cube(), Vec3::zeros())?;
//!
//!     for _ in 0..60 {
//!         engine.run_frame(1.0 / 60.0);
//!     }
//!     engine.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod render;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetProvider, ImportError, ImportFlags, ImportOptions, Material, Model, ObjProvider, SubMesh},
        core::{CameraConfig, Config, EngineConfig, ShaderConfig},
        ecs::{
            Behaviour, BehaviourComponent, CameraComponent, CameraMovement, CommandQueue, ComponentKind,
            EntityId, FrameStats, HookContext, Lifecycle, MeshComponent, Registry, RegistryError,
            RendererComponent, TransformComponent,
        },
        foundation::{
            math::{Mat4, Quat, Vec3, Vec4},
            time::Timer,
        },
        input::InputEvent,
        render::{HeadlessBackend, RenderBackend, ShaderSource},
        Engine, EngineError,
    };
}
