//! Backend abstraction traits for the rendering system
//!
//! The scene core never issues graphics-API calls itself. Everything it needs
//! from the GPU goes through [`RenderBackend`], and every resource it owns is
//! an opaque handle returned by the backend.

use thiserror::Error;

use crate::foundation::math::{Mat3, Mat4, Vec3, Vec4};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BuildError>;

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Handle to an uploaded vertex array (vertex, normal and index buffers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayHandle(pub u32);

/// Shader pipeline stage, used in build diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// The backend failed to produce a resource handle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// A shader stage did not compile
    #[error("{stage} shader compilation failed: {log}")]
    Compile {
        /// Failing stage
        stage: ShaderStage,
        /// Compiler info log
        log: String,
    },

    /// Compiled stages did not link into a program
    #[error("Program link failed: {0}")]
    Link(String),

    /// Vertex data could not be uploaded
    #[error("Mesh upload failed: {0}")]
    Upload(String),
}

/// Per-draw uniform block
///
/// Mirrors what the built-in shaders consume: matrices for position and
/// normal transformation plus lighting and material inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawUniforms {
    /// Projection * view * model
    pub mvp: Mat4,
    /// Model (object to world) matrix
    pub model: Mat4,
    /// Inverse-transpose of the model matrix's upper 3x3 block
    pub normal_matrix: Mat3,
    /// Direction towards the key light, world space
    pub light_direction: Vec3,
    /// Camera position, world space
    pub camera_position: Vec3,
    /// Diffuse color after the renderer's tint is applied
    pub base_color: Vec4,
}

/// Main rendering backend trait
///
/// Implementations wrap a concrete graphics API. The core calls these methods
/// from lifecycle hooks and the frame scheduler; it never assumes a globally
/// current context.
pub trait RenderBackend {
    /// Compile and link a shader program from vertex and fragment sources
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<ProgramHandle>;

    /// Destroy a program previously returned by `compile_program`
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Upload positions, triangle indices and normals into a vertex array
    fn upload_mesh(&mut self, vertices: &[Vec3], indices: &[u32], normals: &[Vec3]) -> BackendResult<VertexArrayHandle>;

    /// Destroy a vertex array previously returned by `upload_mesh`
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Submit an indexed draw
    fn draw(&mut self, vertex_array: VertexArrayHandle, program: ProgramHandle, uniforms: &DrawUniforms);

    /// Clear the frame before the render pass
    fn begin_frame(&mut self, clear_color: [f32; 4]);

    /// Flip buffers at the end of a frame
    fn present(&mut self);
}
