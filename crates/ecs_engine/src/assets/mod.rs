//! Asset import boundary
//!
//! The core never parses asset bytes on its own behalf. It asks an
//! [`AssetProvider`] for a [`Model`] and treats any failure as an
//! [`ImportError`] surfaced to the caller, never retried.

pub mod model;
pub mod mtl_parser;
pub mod obj_loader;

pub use model::{Material, Model, SubMesh};
pub use mtl_parser::MtlParser;
pub use obj_loader::ObjProvider;

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use thiserror::Error;

use crate::core::config::AssetConfig;

bitflags! {
    /// Post-processing steps requested from a provider
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImportFlags: u32 {
        /// Split polygons with more than three corners into triangles
        const TRIANGULATE = 1 << 0;
        /// Generate normals for meshes that have none
        const GENERATE_NORMALS = 1 << 1;
    }
}

/// Import options handed to a provider with each request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// Post-processing steps
    pub flags: ImportFlags,
    /// Maximum angle in degrees between faces whose generated normals are averaged
    pub smoothing_angle: f32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            flags: ImportFlags::TRIANGULATE | ImportFlags::GENERATE_NORMALS,
            smoothing_angle: 60.0,
        }
    }
}

impl From<&AssetConfig> for ImportOptions {
    fn from(config: &AssetConfig) -> Self {
        let mut flags = ImportFlags::empty();
        flags.set(ImportFlags::TRIANGULATE, config.triangulate);
        flags.set(ImportFlags::GENERATE_NORMALS, config.generate_normals);
        Self {
            flags,
            smoothing_angle: config.smoothing_angle,
        }
    }
}

/// Asset import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// File does not exist
    #[error("Asset not found: {0}")]
    NotFound(PathBuf),

    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line in a text format
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// Data parsed but does not describe a usable model
    #[error("Invalid data: {0}")]
    InvalidFormat(String),

    /// Valid data the provider cannot handle with the given options
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// External source of mesh/material graphs
pub trait AssetProvider {
    /// Import the asset at `path`
    fn load(&self, path: &Path, options: &ImportOptions) -> Result<Model, ImportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_asset_config() {
        let config = AssetConfig {
            triangulate: false,
            smoothing_angle: 30.0,
            ..AssetConfig::default()
        };
        let options = ImportOptions::from(&config);

        assert!(!options.flags.contains(ImportFlags::TRIANGULATE));
        assert!(options.flags.contains(ImportFlags::GENERATE_NORMALS));
        assert_eq!(options.smoothing_angle, 30.0);
    }
}
