//! In-memory rendering backend
//!
//! `HeadlessBackend` hands out handles and counts calls without touching a
//! GPU. It drives headless runs of the demo app and lets tests observe
//! exactly which resources the core built, drew and released.

use std::collections::BTreeSet;

use super::backend::{
    BackendResult, BuildError, DrawUniforms, ProgramHandle, RenderBackend, ShaderStage, VertexArrayHandle,
};
use crate::foundation::math::Vec3;

/// Call counters accumulated by [`HeadlessBackend`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Successful `compile_program` calls
    pub programs_compiled: usize,
    /// `compile_program` calls that returned an error
    pub program_failures: usize,
    /// `destroy_program` calls on live handles
    pub programs_destroyed: usize,
    /// Successful `upload_mesh` calls
    pub meshes_uploaded: usize,
    /// `upload_mesh` calls that returned an error
    pub upload_failures: usize,
    /// `destroy_vertex_array` calls on live handles
    pub vertex_arrays_destroyed: usize,
    /// Draw submissions
    pub draws: usize,
    /// Frames presented
    pub frames_presented: usize,
}

/// One recorded draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Vertex array drawn
    pub vertex_array: VertexArrayHandle,
    /// Program bound for the draw
    pub program: ProgramHandle,
    /// Uniforms supplied with the draw
    pub uniforms: DrawUniforms,
}

/// Rendering backend that records instead of rendering
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u32,
    live_programs: BTreeSet<ProgramHandle>,
    live_vertex_arrays: BTreeSet<VertexArrayHandle>,
    frame_draws: Vec<DrawCall>,
    stats: BackendStats,
    pending_program_failures: usize,
    pending_upload_failures: usize,
    clear_color: [f32; 4],
}

impl HeadlessBackend {
    /// Create a new headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `compile_program` fail
    pub fn fail_next_program_builds(&mut self, count: usize) {
        self.pending_program_failures = count;
    }

    /// Make the next `count` calls to `upload_mesh` fail
    pub fn fail_next_uploads(&mut self, count: usize) {
        self.pending_upload_failures = count;
    }

    /// Accumulated call counters
    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    /// Programs created and not yet destroyed
    pub fn live_programs(&self) -> &BTreeSet<ProgramHandle> {
        &self.live_programs
    }

    /// Vertex arrays created and not yet destroyed
    pub fn live_vertex_arrays(&self) -> &BTreeSet<VertexArrayHandle> {
        &self.live_vertex_arrays
    }

    /// Draws submitted since the last `begin_frame`
    pub fn frame_draws(&self) -> &[DrawCall] {
        &self.frame_draws
    }

    /// Color passed to the most recent `begin_frame`
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    fn allocate(&mut self) -> u32 {
        // 0 is reserved as "no object"
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<ProgramHandle> {
        if self.pending_program_failures > 0 {
            self.pending_program_failures -= 1;
            self.stats.program_failures += 1;
            return Err(BuildError::Link("injected failure".to_string()));
        }
        if vertex_source.trim().is_empty() {
            self.stats.program_failures += 1;
            return Err(BuildError::Compile { stage: ShaderStage::Vertex, log: "empty source".to_string() });
        }
        if fragment_source.trim().is_empty() {
            self.stats.program_failures += 1;
            return Err(BuildError::Compile { stage: ShaderStage::Fragment, log: "empty source".to_string() });
        }

        let program = ProgramHandle(self.allocate());
        self.live_programs.insert(program);
        self.stats.programs_compiled += 1;
        log::trace!("Headless: compiled program {}", program.0);
        Ok(program)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if self.live_programs.remove(&program) {
            self.stats.programs_destroyed += 1;
        } else {
            log::warn!("Headless: destroy of unknown program {}", program.0);
        }
    }

    fn upload_mesh(&mut self, vertices: &[Vec3], indices: &[u32], normals: &[Vec3]) -> BackendResult<VertexArrayHandle> {
        if self.pending_upload_failures > 0 {
            self.pending_upload_failures -= 1;
            self.stats.upload_failures += 1;
            return Err(BuildError::Upload("injected failure".to_string()));
        }
        if let Some(bad) = indices.iter().find(|&&index| index as usize >= vertices.len()) {
            self.stats.upload_failures += 1;
            return Err(BuildError::Upload(format!(
                "index {} out of range for {} vertices",
                bad,
                vertices.len()
            )));
        }
        if !normals.is_empty() && normals.len() != vertices.len() {
            self.stats.upload_failures += 1;
            return Err(BuildError::Upload(format!(
                "{} normals for {} vertices",
                normals.len(),
                vertices.len()
            )));
        }

        let vertex_array = VertexArrayHandle(self.allocate());
        self.live_vertex_arrays.insert(vertex_array);
        self.stats.meshes_uploaded += 1;
        Ok(vertex_array)
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.live_vertex_arrays.remove(&vertex_array) {
            self.stats.vertex_arrays_destroyed += 1;
        } else {
            log::warn!("Headless: destroy of unknown vertex array {}", vertex_array.0);
        }
    }

    fn draw(&mut self, vertex_array: VertexArrayHandle, program: ProgramHandle, uniforms: &DrawUniforms) {
        self.stats.draws += 1;
        self.frame_draws.push(DrawCall { vertex_array, program, uniforms: uniforms.clone() });
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
        self.frame_draws.clear();
    }

    fn present(&mut self) {
        self.stats.frames_presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Vec3>, Vec<u32>) {
        (vec![Vec3::zeros(), Vec3::x(), Vec3::y()], vec![0, 1, 2])
    }

    #[test]
    fn test_handles_are_distinct_and_nonzero() {
        let mut backend = HeadlessBackend::new();
        let (vertices, indices) = triangle();
        let program = backend.compile_program("v", "f").unwrap();
        let vertex_array = backend.upload_mesh(&vertices, &indices, &[]).unwrap();

        assert_ne!(program.0, 0);
        assert_ne!(program.0, vertex_array.0);
        assert_eq!(backend.live_programs().len(), 1);
        assert_eq!(backend.live_vertex_arrays().len(), 1);
    }

    #[test]
    fn test_injected_failures_are_consumed() {
        let mut backend = HeadlessBackend::new();
        backend.fail_next_program_builds(1);

        assert!(backend.compile_program("v", "f").is_err());
        assert!(backend.compile_program("v", "f").is_ok());
        assert_eq!(backend.stats().program_failures, 1);
        assert_eq!(backend.stats().programs_compiled, 1);
    }

    #[test]
    fn test_empty_source_fails_with_stage() {
        let mut backend = HeadlessBackend::new();
        let err = backend.compile_program("v", "  ").unwrap_err();
        assert_eq!(err, BuildError::Compile { stage: ShaderStage::Fragment, log: "empty source".to_string() });
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut backend = HeadlessBackend::new();
        let (vertices, _) = triangle();
        assert!(matches!(backend.upload_mesh(&vertices, &[0, 1, 3], &[]), Err(BuildError::Upload(_))));
    }

    #[test]
    fn test_destroy_only_counts_live_handles() {
        let mut backend = HeadlessBackend::new();
        let program = backend.compile_program("v", "f").unwrap();
        backend.destroy_program(program);
        backend.destroy_program(program);
        assert_eq!(backend.stats().programs_destroyed, 1);
        assert!(backend.live_programs().is_empty());
    }
}
