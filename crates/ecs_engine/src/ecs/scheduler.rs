//! Frame scheduling
//!
//! One frame runs in a fixed order:
//!
//! 1. Resolve the active camera and compute view/projection. Without an
//!    enabled camera the render pass is skipped, updates still run.
//! 2. Update pass: entities in creation order, components in
//!    [`ComponentKind`] order. Each enabled component runs `early_update`,
//!    `update` and `late_update` before the next component starts.
//! 3. Render pass: every enabled renderer draws its sibling mesh with the
//!    sibling transform's matrix.
//! 4. Present.
//! 5. Apply the commands hooks recorded during the frame.

use std::time::Instant;

use super::commands::CommandQueue;
use super::component::ComponentKind;
use super::components::{CameraComponent, MeshComponent, RendererComponent, TransformComponent};
use super::entity::EntityId;
use super::lifecycle::{HookContext, LifecycleState};
use super::registry::Registry;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::RenderBackend;

/// Camera matrices for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    /// World-to-camera transformation
    pub view: Mat4,
    /// Camera-to-clip transformation
    pub projection: Mat4,
    /// Camera position in world space
    pub camera_position: Vec3,
}

impl FrameView {
    /// Matrices of `camera`
    pub fn from_camera(camera: &CameraComponent) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            camera_position: camera.position,
        }
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Whether a camera was available and the render pass ran
    pub rendered: bool,
    /// Components that ran their per-frame hooks
    pub components_updated: usize,
    /// Renderers that drew at least one sub-mesh
    pub renderers_drawn: usize,
    /// Draw submissions
    pub draw_calls: usize,
    /// Sub-meshes skipped for lack of resources
    pub sub_meshes_skipped: usize,
    /// Deferred commands applied after the frame
    pub commands_applied: usize,
    /// Time spent in the update pass (microseconds)
    pub update_time_us: u64,
    /// Time spent in the render pass (microseconds)
    pub render_time_us: u64,
}

impl FrameStats {
    /// Total frame time in microseconds
    pub fn total_frame_time_us(&self) -> u64 {
        self.update_time_us + self.render_time_us
    }
}

/// Drives the per-frame update and render passes
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_count: u64,
    light_direction: Vec3,
    clear_color: [f32; 4],
}

impl FrameScheduler {
    /// Create a scheduler clearing to `clear_color`
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            frame_count: 0,
            light_direction: Vec3::new(0.0, 1.0, 1.0).normalize(),
            clear_color,
        }
    }

    /// Direction towards the key light; ignored if zero
    pub fn set_light_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize(f32::EPSILON) {
            self.light_direction = direction;
        }
    }

    /// Current light direction
    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run one frame
    pub fn run_frame(
        &mut self,
        registry: &mut Registry,
        active_camera: Option<EntityId>,
        backend: &mut dyn RenderBackend,
        delta_time: f32,
    ) -> FrameStats {
        self.frame_count += 1;
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        let frame_view = Self::resolve_camera(registry, active_camera);
        let mut commands = CommandQueue::new();

        let update_start = Instant::now();
        stats.components_updated = Self::update_pass(registry, backend, &mut commands, delta_time);
        stats.update_time_us = elapsed_us(update_start);

        if let Some(frame_view) = frame_view {
            let render_start = Instant::now();
            backend.begin_frame(self.clear_color);
            self.render_pass(registry, &frame_view, backend, &mut stats);
            backend.present();
            stats.rendered = true;
            stats.render_time_us = elapsed_us(render_start);
        } else {
            log::debug!("Frame {}: no enabled camera, render pass skipped", self.frame_count);
        }

        if !commands.is_empty() {
            stats.commands_applied = registry.apply_commands(&mut commands, backend);
        }

        log::debug!(
            "Frame {}: {} updated, {} draws, {} skipped, {} commands",
            stats.frame,
            stats.components_updated,
            stats.draw_calls,
            stats.sub_meshes_skipped,
            stats.commands_applied
        );
        stats
    }

    fn resolve_camera(registry: &Registry, active_camera: Option<EntityId>) -> Option<FrameView> {
        let id = active_camera?;
        if registry.component_state(id, ComponentKind::Camera) != Some(LifecycleState::Enabled) {
            return None;
        }
        registry.get_component::<CameraComponent>(id).map(FrameView::from_camera)
    }

    fn update_pass(
        registry: &mut Registry,
        backend: &mut dyn RenderBackend,
        commands: &mut CommandQueue,
        delta_time: f32,
    ) -> usize {
        let mut updated = 0;
        for entity in registry.entities_mut() {
            for kind in ComponentKind::ALL {
                let Some(mut slot) = entity.take_slot(kind) else {
                    continue;
                };
                if slot.state() == LifecycleState::Enabled {
                    let mut ctx = HookContext::new(entity, &mut *backend, &mut *commands, delta_time);
                    slot.run_update(&mut ctx);
                    updated += 1;
                }
                entity.put_slot(slot);
            }
        }
        updated
    }

    fn render_pass(
        &self,
        registry: &Registry,
        frame_view: &FrameView,
        backend: &mut dyn RenderBackend,
        stats: &mut FrameStats,
    ) {
        for id in registry.query_ids(ComponentKind::Renderer) {
            let Some(entity) = registry.entity(id) else {
                continue;
            };
            if entity.slot(ComponentKind::Renderer).map(|slot| slot.state()) != Some(LifecycleState::Enabled) {
                continue;
            }
            let (Some(renderer), Some(mesh)) = (entity.get::<RendererComponent>(), entity.get::<MeshComponent>()) else {
                continue;
            };
            if !entity.is_enabled::<MeshComponent>() {
                continue;
            }

            let model = entity
                .get::<TransformComponent>()
                .map_or_else(Mat4::identity, TransformComponent::to_matrix);
            let outcome = renderer.draw(mesh, &model, frame_view, self.light_direction, backend);
            stats.draw_calls += outcome.drawn;
            stats.sub_meshes_skipped += outcome.skipped;
            if outcome.drawn > 0 {
                stats.renderers_drawn += 1;
            }
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0])
    }
}

fn elapsed_us(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
