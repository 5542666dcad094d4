//! Renderer component
//!
//! Draws the sibling [`MeshComponent`] and owns the GPU resources built for
//! it. Resources follow the lifecycle: they are built when the component
//! becomes enabled (including right after awake) and released when it is
//! disabled. Each renderer keeps its own cache, even when it shares a mesh
//! with another renderer.
//!
//! A renderer enabled before its entity has a mesh waits for one: the build
//! is retried once from `early_update` after a mesh sibling appears.

use std::sync::Arc;

use super::mesh::MeshComponent;
use crate::ecs::inspect::{Inspect, Property, PropertyValue};
use crate::ecs::lifecycle::{HookContext, Lifecycle};
use crate::ecs::scheduler::FrameView;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};
use crate::render::{DrawUniforms, RenderBackend, ResourceCache, ShaderSource};

/// Result of drawing one renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Sub-meshes submitted to the backend
    pub drawn: usize,
    /// Sub-meshes with no cached resources
    pub skipped: usize,
}

/// Draws a sibling mesh with a shader program
#[derive(Debug)]
pub struct RendererComponent {
    shaders: Arc<ShaderSource>,
    tint: Vec4,
    cache: ResourceCache,
    awaiting_mesh: bool,
}

impl Default for RendererComponent {
    fn default() -> Self {
        Self::new(Arc::new(ShaderSource::builtin()))
    }
}

impl RendererComponent {
    /// Create a renderer compiling `shaders` for each sub-mesh
    pub fn new(shaders: Arc<ShaderSource>) -> Self {
        Self {
            shaders,
            tint: Vec4::new(1.0, 1.0, 1.0, 1.0),
            cache: ResourceCache::new(),
            awaiting_mesh: false,
        }
    }

    /// Builder pattern: Set the color multiplied into every material
    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint;
        self
    }

    /// Color multiplied into every material's diffuse color
    pub fn tint(&self) -> Vec4 {
        self.tint
    }

    /// Change the tint; takes effect on the next draw
    pub fn set_tint(&mut self, tint: Vec4) {
        self.tint = tint;
    }

    /// Shader sources compiled by this renderer
    pub fn shaders(&self) -> &Arc<ShaderSource> {
        &self.shaders
    }

    /// Resources built so far
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Whether the renderer was enabled without a mesh and has not built yet
    pub fn is_awaiting_mesh(&self) -> bool {
        self.awaiting_mesh
    }

    fn build(&mut self, ctx: &mut HookContext<'_>) {
        let (siblings, backend) = ctx.siblings_and_backend();
        let Some(mesh) = siblings.get::<MeshComponent>() else {
            log::warn!("Renderer on entity {} has no mesh to build", siblings.id());
            self.awaiting_mesh = true;
            return;
        };
        self.awaiting_mesh = false;
        let report = self.cache.ensure_built(mesh.sub_meshes(), &self.shaders, backend);
        log::info!(
            "Built resources for '{}': {} new, {} cached, {} failed",
            siblings.name(),
            report.built,
            report.reused,
            report.failed
        );
    }

    /// Submit one draw per cached sub-mesh of `mesh`
    ///
    /// Sub-meshes without resources (failed or not yet built) are skipped.
    pub fn draw(
        &self,
        mesh: &MeshComponent,
        model: &Mat4,
        frame: &FrameView,
        light_direction: Vec3,
        backend: &mut dyn RenderBackend,
    ) -> DrawOutcome {
        let mut outcome = DrawOutcome::default();
        let mvp = frame.projection * frame.view * model;
        let normal_matrix = model.normal_matrix();

        for sub_mesh in mesh.sub_meshes() {
            let Some(gpu) = self.cache.get(sub_mesh) else {
                log::trace!("No resources for sub-mesh '{}', skipping draw", sub_mesh.name);
                outcome.skipped += 1;
                continue;
            };
            let uniforms = DrawUniforms {
                mvp,
                model: *model,
                normal_matrix,
                light_direction,
                camera_position: frame.camera_position,
                base_color: sub_mesh.material.diffuse.component_mul(&self.tint),
            };
            backend.draw(gpu.vertex_array, gpu.program, &uniforms);
            outcome.drawn += 1;
        }
        outcome
    }
}

impl Lifecycle for RendererComponent {
    fn on_enable(&mut self, ctx: &mut HookContext<'_>) {
        self.build(ctx);
    }

    fn early_update(&mut self, ctx: &mut HookContext<'_>) {
        if self.awaiting_mesh && ctx.sibling::<MeshComponent>().is_some() {
            log::debug!("Mesh arrived on '{}', building late", ctx.entity_name());
            self.build(ctx);
        }
    }

    fn on_disable(&mut self, ctx: &mut HookContext<'_>) {
        self.awaiting_mesh = false;
        let released = self.cache.release_all(ctx.backend());
        log::info!("Released {} resource entries for '{}'", released, ctx.entity_name());
    }
}

impl Inspect for RendererComponent {
    fn properties(&self) -> Vec<Property> {
        vec![
            Property::new("tint", PropertyValue::Color(self.tint)),
            Property::new("cached_resources", PropertyValue::Count(self.cache.len())),
        ]
    }
}
