//! Shader source management
//!
//! Renderers compile one program per cached sub-mesh from a shared
//! [`ShaderSource`]. Sources come from the files named in [`ShaderConfig`]
//! or from the built-in Lambert shaders below.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::core::config::ShaderConfig;

const BUILTIN_VERTEX: &str = r"#version 330 core
layout(location = 0) in vec3 Position;
layout(location = 1) in vec3 Normal;

uniform mat4 MvpMatrix;
uniform mat4 ModelMatrix;
uniform mat3 NormalMatrix;

out vec3 WorldNormal;
out vec3 WorldPosition;

void main()
{
    WorldNormal = normalize(NormalMatrix * Normal);
    WorldPosition = vec3(ModelMatrix * vec4(Position, 1.0));
    gl_Position = MvpMatrix * vec4(Position, 1.0);
}
";

const BUILTIN_FRAGMENT: &str = r"#version 330 core
in vec3 WorldNormal;
in vec3 WorldPosition;

uniform vec3 LightDirection;
uniform vec3 CameraPos;
uniform vec4 ColorDiffuse;

out vec4 FragColor;

void main()
{
    float diffuse = max(dot(normalize(WorldNormal), normalize(LightDirection)), 0.0);
    float ambient = 0.15;
    FragColor = vec4(ColorDiffuse.rgb * (ambient + diffuse), ColorDiffuse.a);
}
";

/// Shader loading errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// A source file could not be read
    #[error("Failed to read shader {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A source file was read but contains no code
    #[error("Shader source is empty: {0}")]
    Empty(PathBuf),
}

/// Vertex and fragment source pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage GLSL
    pub vertex: String,
    /// Fragment stage GLSL
    pub fragment: String,
}

impl ShaderSource {
    /// Create a source pair from in-memory strings
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// The built-in diffuse-lit shaders
    pub fn builtin() -> Self {
        Self::new(BUILTIN_VERTEX, BUILTIN_FRAGMENT)
    }

    /// Read both stages from the paths in `config`
    pub fn load(config: &ShaderConfig) -> Result<Self, ShaderError> {
        let vertex = read_source(Path::new(&config.vertex_shader_path))?;
        let fragment = read_source(Path::new(&config.fragment_shader_path))?;
        log::info!(
            "Loaded shaders {} / {}",
            config.vertex_shader_path,
            config.fragment_shader_path
        );
        Ok(Self { vertex, fragment })
    }

    /// Load from `config`, falling back to the built-in shaders on failure
    ///
    /// Files that are absent are the normal case and only logged at info
    /// level; files that exist but cannot be used are warned about.
    pub fn load_or_builtin(config: &ShaderConfig) -> Arc<Self> {
        if !config.is_present() {
            log::info!(
                "Shader files {} / {} not found, using built-in shaders",
                config.vertex_shader_path,
                config.fragment_shader_path
            );
            return Arc::new(Self::builtin());
        }
        match Self::load(config) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                log::warn!("{}; using built-in shaders", e);
                Arc::new(Self::builtin())
            }
        }
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(ShaderError::Empty(path.to_path_buf()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_declares_consumed_uniforms() {
        let source = ShaderSource::builtin();
        for uniform in ["MvpMatrix", "ModelMatrix", "NormalMatrix"] {
            assert!(source.vertex.contains(uniform), "missing {uniform}");
        }
        for uniform in ["LightDirection", "ColorDiffuse"] {
            assert!(source.fragment.contains(uniform), "missing {uniform}");
        }
    }

    #[test]
    fn test_missing_files_fall_back() {
        let config = ShaderConfig::new("does/not/exist.vert", "does/not/exist.frag");
        assert!(matches!(ShaderSource::load(&config), Err(ShaderError::Io { .. })));
        assert_eq!(*ShaderSource::load_or_builtin(&config), ShaderSource::builtin());
    }

    fn write_temp(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("ecs_engine_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_present_files_are_loaded() {
        let config = ShaderConfig::new(
            write_temp("present.vert", "void main() {}"),
            write_temp("present.frag", "void main() { }"),
        );
        assert!(config.is_present());

        let source = ShaderSource::load_or_builtin(&config);
        assert_eq!(source.vertex, "void main() {}");
        assert_eq!(source.fragment, "void main() { }");
    }

    #[test]
    fn test_present_but_empty_falls_back() {
        let config = ShaderConfig::new(write_temp("empty.vert", "  \n"), write_temp("empty.frag", "void main() {}"));
        assert!(config.is_present());
        assert!(matches!(ShaderSource::load(&config), Err(ShaderError::Empty(_))));
        assert_eq!(*ShaderSource::load_or_builtin(&config), ShaderSource::builtin());
    }

    #[test]
    fn test_half_present_pair_is_not_present() {
        let config = ShaderConfig::new(write_temp("half.vert", "void main() {}"), "does/not/exist.frag");
        assert!(!config.is_present());
        assert_eq!(*ShaderSource::load_or_builtin(&config), ShaderSource::builtin());
    }
}
