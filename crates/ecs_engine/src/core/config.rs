//! # Unified Configuration System
//!
//! All configuration structures for the scene core live here: logging,
//! viewport, camera defaults, shader locations and asset import settings.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs to name
//! the values it overrides.

use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::config::{Config, ConfigError};

/// # Shader Configuration
///
/// Locations of the GLSL sources compiled for every cached sub-mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Whether both shader files exist on disk
    pub fn is_present(&self) -> bool {
        Path::new(&self.vertex_shader_path).is_file() && Path::new(&self.fragment_shader_path).is_file()
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::new("shaders/builtin/pbr.vert", "shaders/builtin/pbr.frag")
    }
}

/// # Camera Configuration
///
/// Defaults applied to cameras created through `Engine::create_camera`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// World units moved per discrete movement event
    pub movement_speed: f32,
    /// Degrees of yaw/pitch per unit of pointer delta
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.01,
            far: 10_000.0,
            movement_speed: 0.1,
            mouse_sensitivity: 0.1,
        }
    }
}

/// # Asset Configuration
///
/// Import settings handed to asset providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: String,
    /// Split polygons into triangles on import
    pub triangulate: bool,
    /// Generate normals for meshes that ship without them
    pub generate_normals: bool,
    /// Maximum angle in degrees between faces whose normals get smoothed
    pub smoothing_angle: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            assets_dir: "resources".to_string(),
            triangulate: true,
            generate_normals: true,
            smoothing_angle: 60.0,
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration for the scene core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Viewport size in pixels, used for the camera aspect ratio
    pub viewport: (u32, u32),
    /// Color the backend clears to at the start of each frame
    pub clear_color: [f32; 4],
    /// Camera defaults
    pub camera: CameraConfig,
    /// Shader source locations
    pub shaders: ShaderConfig,
    /// Asset import settings
    pub assets: AssetConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            viewport: (800, 600),
            clear_color: [0.5, 0.5, 0.5, 1.0],
            camera: CameraConfig::default(),
            shaders: ShaderConfig::default(),
            assets: AssetConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Set clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set camera defaults
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set shader configuration
    pub fn with_shaders(mut self, shaders: ShaderConfig) -> Self {
        self.shaders = shaders;
        self
    }

    /// Set asset configuration
    pub fn with_assets(mut self, assets: AssetConfig) -> Self {
        self.assets = assets;
        self
    }

    /// Viewport aspect ratio (width / height); 1.0 for a zero-height viewport
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.viewport;
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Validate the configuration
    ///
    /// Shader paths are not checked here; the built-in sources are used
    /// when the files are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if log_level_from_str(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!("Unknown log level: {}", self.log_level)));
        }
        if self.camera.near <= 0.0 {
            return Err(ConfigError::Invalid("Camera near plane must be positive".to_string()));
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid("Camera far plane must exceed near plane".to_string()));
        }
        if !(1.0..180.0).contains(&self.camera.fov_degrees) {
            return Err(ConfigError::Invalid(format!(
                "Camera field of view out of range: {}",
                self.camera.fov_degrees
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

fn log_level_from_str(level: &str) -> Option<log::LevelFilter> {
    level.parse::<log::LevelFilter>().ok()
}
