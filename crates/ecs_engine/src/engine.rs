//! Main engine facade
//!
//! [`Engine`] ties the registry, frame scheduler, rendering backend, timer
//! and configuration together and offers the scene-building shortcuts hosts
//! need: cameras, models loaded from disk, input and frame driving.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::assets::{AssetProvider, ImportError, ImportOptions, Model};
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::ecs::{
    CameraComponent, ComponentKind, ComponentType, EntityId, FrameScheduler, FrameStats, MeshComponent, Registry,
    RegistryError, RendererComponent, TransformComponent,
};
use crate::foundation::math::Vec3;
use crate::foundation::time::Timer;
use crate::input::{CameraCommand, InputEvent, InputManager};
use crate::render::{RenderBackend, ShaderError, ShaderSource};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Registry operation failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Asset import failed
    #[error("Asset import failed: {0}")]
    Import(#[from] ImportError),

    /// Configuration invalid or unreadable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shader sources could not be loaded
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),
}

/// Main engine struct
pub struct Engine<B: RenderBackend> {
    registry: Registry,
    scheduler: FrameScheduler,
    backend: B,
    input: InputManager,
    active_camera: Option<EntityId>,
    timer: Timer,
    config: EngineConfig,
    shaders: Arc<ShaderSource>,
    last_stats: FrameStats,
    shut_down: bool,
}

impl<B: RenderBackend> Engine<B> {
    /// Create a new engine instance
    ///
    /// Shaders are read from the configured paths, falling back to the
    /// built-in sources when the files are unavailable.
    pub fn new(config: EngineConfig, backend: B) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;
        let shaders = ShaderSource::load_or_builtin(&config.shaders);

        Ok(Self {
            registry: Registry::new(),
            scheduler: FrameScheduler::new(config.clear_color),
            backend,
            input: InputManager::new(),
            active_camera: None,
            timer: Timer::new(),
            config,
            shaders,
            last_stats: FrameStats::default(),
            shut_down: false,
        })
    }

    /// Builder pattern: Use `shaders` for renderers created from now on
    pub fn with_shaders(mut self, shaders: Arc<ShaderSource>) -> Self {
        self.shaders = shaders;
        self
    }

    /// Reload shaders from the configured paths, failing instead of falling back
    pub fn reload_shaders(&mut self) -> Result<(), EngineError> {
        self.shaders = Arc::new(ShaderSource::load(&self.config.shaders)?);
        Ok(())
    }

    /// Entity registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Entity registry, mutably
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Rendering backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rendering backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Frame scheduler
    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shaders handed to new renderers
    pub fn shaders(&self) -> &Arc<ShaderSource> {
        &self.shaders
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Camera the render pass looks through
    pub fn active_camera(&self) -> Option<EntityId> {
        self.active_camera
    }

    /// Statistics of the most recent frame
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Create an empty entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.registry.create_entity(name)
    }

    /// Create an awakened camera entity at `position`
    ///
    /// The first camera created becomes the active camera.
    pub fn create_camera(&mut self, name: impl Into<String>, position: Vec3) -> Result<EntityId, EngineError> {
        let id = self.registry.create_entity(name);
        let camera = CameraComponent::new(position, &self.config.camera, self.config.aspect_ratio());
        self.registry.add_component(id, camera)?;
        self.registry.awake_entity(id, &mut self.backend)?;
        if self.active_camera.is_none() {
            self.set_active_camera(id)?;
        }
        Ok(id)
    }

    /// Render through the camera on `entity`
    pub fn set_active_camera(&mut self, entity: EntityId) -> Result<(), EngineError> {
        if self.registry.get_component::<CameraComponent>(entity).is_none() {
            return Err(RegistryError::ComponentNotFound {
                entity,
                kind: ComponentKind::Camera,
            }
            .into());
        }
        log::info!("Active camera set to entity {}", entity);
        self.active_camera = Some(entity);
        Ok(())
    }

    /// Stop rendering until another camera is set
    pub fn clear_active_camera(&mut self) {
        self.active_camera = None;
    }

    /// Create an awakened entity drawing `model` at `position`
    ///
    /// The entity gets a Transform, a Mesh and a Renderer using the engine's
    /// current shaders.
    pub fn spawn_model(
        &mut self,
        name: impl Into<String>,
        model: impl Into<Arc<Model>>,
        position: Vec3,
    ) -> Result<EntityId, EngineError> {
        let id = self.registry.create_entity(name);
        self.registry.add_component(id, TransformComponent::from_position(position))?;
        self.registry.add_component(id, MeshComponent::new(model.into()))?;
        self.registry.add_component(id, RendererComponent::new(Arc::clone(&self.shaders)))?;
        self.registry.awake_entity(id, &mut self.backend)?;
        Ok(id)
    }

    /// Import the model at `path` and spawn it at `position`
    ///
    /// Relative paths that do not exist are looked up under the configured
    /// assets directory. The entity is named after the file stem.
    pub fn load_model(
        &mut self,
        provider: &dyn AssetProvider,
        path: impl AsRef<Path>,
        position: Vec3,
    ) -> Result<EntityId, EngineError> {
        let path = self.resolve_asset_path(path.as_ref());
        let options = ImportOptions::from(&self.config.assets);
        let model = provider.load(&path, &options)?;
        let name = path
            .file_stem()
            .map_or_else(|| "model".to_string(), |stem| stem.to_string_lossy().into_owned());
        log::info!(
            "Loaded '{}': {} sub-meshes, {} triangles",
            name,
            model.sub_meshes.len(),
            model.triangle_count()
        );
        self.spawn_model(name, model, position)
    }

    fn resolve_asset_path(&self, path: &Path) -> PathBuf {
        if path.is_relative() && !path.exists() {
            let candidate = Path::new(&self.config.assets.assets_dir).join(path);
            if candidate.exists() {
                return candidate;
            }
        }
        path.to_path_buf()
    }

    /// Awaken every component that is not awake yet
    pub fn awake(&mut self) -> usize {
        self.registry.awake_all(&mut self.backend)
    }

    /// Enable the `T` component of `entity`
    pub fn enable_component<T: ComponentType>(&mut self, entity: EntityId) -> Result<bool, EngineError> {
        Ok(self.registry.enable_component::<T>(entity, &mut self.backend)?)
    }

    /// Disable the `T` component of `entity`
    pub fn disable_component<T: ComponentType>(&mut self, entity: EntityId) -> Result<bool, EngineError> {
        Ok(self.registry.disable_component::<T>(entity, &mut self.backend)?)
    }

    /// Apply a host input event; returns whether anything changed
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let Some(command) = self.input.translate(event) else {
            return false;
        };
        if let CameraCommand::Resize { width, height } = command {
            return self.resize(width, height);
        }

        let Some(camera) = self
            .active_camera
            .and_then(|id| self.registry.get_component_mut::<CameraComponent>(id))
        else {
            log::trace!("Input {:?} ignored, no active camera", event);
            return false;
        };
        match command {
            CameraCommand::Move(direction) => camera.move_in(direction),
            CameraCommand::Rotate { dx, dy } => camera.rotate(dx, dy),
            CameraCommand::Resize { .. } => {}
        }
        true
    }

    /// Record a new viewport size and update every camera's aspect ratio
    ///
    /// A zero-sized viewport (minimized window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        self.config.viewport = (width, height);
        let aspect = self.config.aspect_ratio();
        for id in self.registry.query_ids(ComponentKind::Camera) {
            if let Some(camera) = self.registry.get_component_mut::<CameraComponent>(id) {
                camera.set_aspect_ratio(aspect);
            }
        }
        true
    }

    /// Run one frame with the wall-clock time since the previous tick
    pub fn tick(&mut self) -> FrameStats {
        self.timer.update();
        self.step(self.timer.delta_time())
    }

    /// Run one frame with an explicit delta time in seconds
    pub fn run_frame(&mut self, delta_time: f32) -> FrameStats {
        self.timer.advance(delta_time);
        self.step(self.timer.delta_time())
    }

    fn step(&mut self, delta_time: f32) -> FrameStats {
        let stats = self
            .scheduler
            .run_frame(&mut self.registry, self.active_camera, &mut self.backend, delta_time);
        self.last_stats = stats.clone();
        stats
    }

    /// Disable every renderer so its GPU resources are released
    ///
    /// Returns how many renderers were disabled. Safe to call repeatedly;
    /// also runs when the engine is dropped.
    pub fn shutdown(&mut self) -> usize {
        let mut disabled = 0;
        for id in self.registry.query_ids(ComponentKind::Renderer) {
            match self.registry.disable_kind(id, ComponentKind::Renderer, &mut self.backend) {
                Ok(true) => disabled += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Failed to disable renderer on entity {}: {}", id, e),
            }
        }
        if !self.shut_down {
            log::info!(
                "Engine shutdown complete: {} renderers released after {} frames",
                disabled,
                self.timer.frame_count()
            );
        }
        self.shut_down = true;
        disabled
    }
}

impl<B: RenderBackend> Drop for Engine<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
