//! Rendering contracts
//!
//! The core only talks to the GPU through [`RenderBackend`]. This module also
//! provides the shader sources renderers compile, the identity-keyed cache of
//! the handles built from them, and an in-memory backend for headless runs.

pub mod backend;
pub mod headless;
pub mod resource_cache;
pub mod shader;

pub use backend::{
    BackendResult, BuildError, DrawUniforms, ProgramHandle, RenderBackend, ShaderStage, VertexArrayHandle,
};
pub use headless::{BackendStats, DrawCall, HeadlessBackend};
pub use resource_cache::{BuildReport, GpuResources, ResourceCache, ResourceKey};
pub use shader::{ShaderError, ShaderSource};
