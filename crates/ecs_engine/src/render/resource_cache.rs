//! Per-renderer GPU resource cache
//!
//! Maps sub-mesh identity to the program and vertex array built for it.
//! Entries are created by [`ResourceCache::ensure_built`] and destroyed by
//! [`ResourceCache::release_all`]; the owning renderer calls these from its
//! enable/disable hooks.

use std::collections::HashMap;
use std::sync::Arc;

use super::backend::{ProgramHandle, RenderBackend, VertexArrayHandle};
use super::shader::ShaderSource;
use crate::assets::SubMesh;

/// Identity of a shared resource: the address of its `Arc` allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKey(usize);

impl ResourceKey {
    /// Key for the allocation behind `resource`
    pub fn of<T>(resource: &Arc<T>) -> Self {
        Self(Arc::as_ptr(resource).cast::<()>() as usize)
    }
}

/// Backend handles built for one sub-mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuResources {
    /// Linked shader program
    pub program: ProgramHandle,
    /// Uploaded vertex array
    pub vertex_array: VertexArrayHandle,
}

/// Cache entry with the resource it was built from
#[derive(Debug)]
struct CacheEntry {
    /// Keeps the allocation alive so its address cannot be reused by another key
    _source: Arc<SubMesh>,
    gpu: GpuResources,
}

/// Outcome of one `ensure_built` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Entries created
    pub built: usize,
    /// Sub-meshes already cached
    pub reused: usize,
    /// Sub-meshes whose build failed
    pub failed: usize,
}

/// Identity-keyed map of backend handles
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<ResourceKey, CacheEntry>,
    building: bool,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Build handles for every sub-mesh not already cached
    ///
    /// Returns immediately if a build is already running. A sub-mesh whose
    /// program or upload fails is left out; a program compiled for a failed
    /// upload is destroyed again.
    pub fn ensure_built(
        &mut self,
        sub_meshes: &[Arc<SubMesh>],
        shaders: &ShaderSource,
        backend: &mut dyn RenderBackend,
    ) -> BuildReport {
        let mut report = BuildReport::default();
        if self.building {
            log::debug!("Resource build already in progress, skipping");
            return report;
        }
        self.building = true;

        for sub_mesh in sub_meshes {
            let key = ResourceKey::of(sub_mesh);
            if self.entries.contains_key(&key) {
                report.reused += 1;
                continue;
            }

            let program = match backend.compile_program(&shaders.vertex, &shaders.fragment) {
                Ok(program) => program,
                Err(e) => {
                    log::warn!("Shader build for '{}' failed: {}", sub_mesh.name, e);
                    report.failed += 1;
                    continue;
                }
            };

            let vertex_array = match backend.upload_mesh(&sub_mesh.positions, &sub_mesh.indices, &sub_mesh.normals) {
                Ok(vertex_array) => vertex_array,
                Err(e) => {
                    log::warn!("Mesh upload for '{}' failed: {}", sub_mesh.name, e);
                    backend.destroy_program(program);
                    report.failed += 1;
                    continue;
                }
            };

            self.entries.insert(
                key,
                CacheEntry {
                    _source: Arc::clone(sub_mesh),
                    gpu: GpuResources { program, vertex_array },
                },
            );
            report.built += 1;
        }

        self.building = false;
        report
    }

    /// Destroy every cached handle and clear the cache
    ///
    /// Returns the number of entries released.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) -> usize {
        let released = self.entries.len();
        for (_, entry) in self.entries.drain() {
            backend.destroy_program(entry.gpu.program);
            backend.destroy_vertex_array(entry.gpu.vertex_array);
        }
        released
    }

    /// Handles for `sub_mesh`, if built
    pub fn get(&self, sub_mesh: &Arc<SubMesh>) -> Option<GpuResources> {
        self.entries.get(&ResourceKey::of(sub_mesh)).map(|entry| entry.gpu)
    }

    /// Every cached handle pair, in no particular order
    pub fn resources(&self) -> impl Iterator<Item = GpuResources> + '_ {
        self.entries.values().map(|entry| entry.gpu)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a build is running
    pub fn is_building(&self) -> bool {
        self.building
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            log::warn!(
                "Resource cache dropped with {} live entries; disable the renderer before removing it",
                self.entries.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Model;
    use crate::render::HeadlessBackend;

    #[test]
    fn test_build_is_idempotent_per_identity() {
        let model = Model::cube();
        let shaders = ShaderSource::builtin();
        let mut backend = HeadlessBackend::new();
        let mut cache = ResourceCache::new();

        let first = cache.ensure_built(&model.sub_meshes, &shaders, &mut backend);
        let second = cache.ensure_built(&model.sub_meshes, &shaders, &mut backend);

        assert_eq!(first.built, 1);
        assert_eq!(second, BuildReport { built: 0, reused: 1, failed: 0 });
        assert_eq!(backend.stats().programs_compiled, 1);
        assert!(cache.get(&model.sub_meshes[0]).is_some());
        cache.release_all(&mut backend);
    }

    #[test]
    fn test_equal_contents_are_distinct_keys() {
        let a = Model::triangle();
        let b = Model::triangle();
        let mut sub_meshes = a.sub_meshes.clone();
        sub_meshes.extend(b.sub_meshes.iter().cloned());

        let mut backend = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let report = cache.ensure_built(&sub_meshes, &ShaderSource::builtin(), &mut backend);

        assert_eq!(report.built, 2);
        assert_ne!(cache.get(&a.sub_meshes[0]), cache.get(&b.sub_meshes[0]));
        cache.release_all(&mut backend);
    }

    #[test]
    fn test_release_destroys_each_entry_once() {
        let model = Model::triangle();
        let mut backend = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        cache.ensure_built(&model.sub_meshes, &ShaderSource::builtin(), &mut backend);

        assert_eq!(cache.release_all(&mut backend), 1);
        assert_eq!(cache.release_all(&mut backend), 0);
        assert!(cache.is_empty());

        let stats = backend.stats();
        assert_eq!(stats.programs_destroyed, 1);
        assert_eq!(stats.vertex_arrays_destroyed, 1);
        assert!(backend.live_programs().is_empty());
        assert!(backend.live_vertex_arrays().is_empty());
    }

    #[test]
    fn test_failed_upload_leaves_no_partial_entry() {
        let model = Model::triangle();
        let mut backend = HeadlessBackend::new();
        backend.fail_next_uploads(1);
        let mut cache = ResourceCache::new();

        let report = cache.ensure_built(&model.sub_meshes, &ShaderSource::builtin(), &mut backend);

        assert_eq!(report.failed, 1);
        assert!(cache.is_empty());
        assert!(backend.live_programs().is_empty());
        assert_eq!(backend.stats().programs_destroyed, 1);
    }

    #[test]
    fn test_failed_compile_skips_upload() {
        let model = Model::triangle();
        let mut backend = HeadlessBackend::new();
        backend.fail_next_program_builds(1);
        let mut cache = ResourceCache::new();

        let report = cache.ensure_built(&model.sub_meshes, &ShaderSource::builtin(), &mut backend);

        assert_eq!(report.failed, 1);
        assert_eq!(backend.stats().meshes_uploaded, 0);

        let retry = cache.ensure_built(&model.sub_meshes, &ShaderSource::builtin(), &mut backend);
        assert_eq!(retry.built, 1);
        cache.release_all(&mut backend);
    }

    #[test]
    fn test_build_in_flight_is_single_flight() {
        let model = Model::triangle();
        let mut backend = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        cache.building = true;

        let report = cache.ensure_built(&model.sub_meshes, &ShaderSource::builtin(), &mut backend);

        assert_eq!(report, BuildReport::default());
        assert_eq!(backend.stats().programs_compiled, 0);
        assert!(cache.is_building());
    }
}
