//! # Core Engine Module
//!
//! Shared configuration used by every subsystem.

pub mod config;

pub use config::{
    AssetConfig,
    CameraConfig,
    EngineConfig,
    ShaderConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
