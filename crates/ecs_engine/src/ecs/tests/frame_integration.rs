//! Frame loop: update ordering, render pass and deferred commands

use std::sync::Arc;

use approx::assert_relative_eq;

use super::{spawn_camera, spawn_recorder, spawn_renderable, Journal};
use crate::assets::Model;
use crate::ecs::{
    Behaviour, BehaviourComponent, CameraComponent, ComponentKind, FrameScheduler, HookContext, Lifecycle,
    MeshComponent, Registry, RendererComponent, TransformComponent,
};
use crate::foundation::logging;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::HeadlessBackend;

#[test]
fn test_no_camera_skips_render_but_updates() {
    logging::init_test();
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let journal = Journal::default();
    spawn_recorder(&mut registry, "p", &journal);
    spawn_renderable(&mut registry, "Teapot", Arc::new(Model::triangle()));
    registry.awake_all(&mut backend);

    let mut scheduler = FrameScheduler::default();
    let stats = scheduler.run_frame(&mut registry, None, &mut backend, 0.016);

    assert!(!stats.rendered);
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(backend.stats().frames_presented, 0);
    assert_eq!(journal.count("p:update"), 1);
}

#[test]
fn test_disabled_camera_skips_render() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    spawn_renderable(&mut registry, "Teapot", Arc::new(Model::triangle()));
    registry.awake_all(&mut backend);
    registry.disable_component::<CameraComponent>(camera, &mut backend).unwrap();

    let mut scheduler = FrameScheduler::default();
    let stats = scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert!(!stats.rendered);
    assert_eq!(backend.stats().draws, 0);
}

#[test]
fn test_update_pass_order() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let journal = Journal::default();
    spawn_recorder(&mut registry, "a", &journal);
    spawn_recorder(&mut registry, "b", &journal);
    registry.awake_all(&mut backend);
    journal.clear();

    let mut scheduler = FrameScheduler::default();
    scheduler.run_frame(&mut registry, None, &mut backend, 0.016);

    assert_eq!(
        journal.entries(),
        vec!["a:early", "a:update", "a:late", "b:early", "b:update", "b:late"]
    );
}

#[test]
fn test_only_enabled_awake_components_update() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let journal = Journal::default();
    let asleep = spawn_recorder(&mut registry, "asleep", &journal);
    let off = spawn_recorder(&mut registry, "off", &journal);
    let on = spawn_recorder(&mut registry, "on", &journal);
    registry.awake_entity(off, &mut backend).unwrap();
    registry.awake_entity(on, &mut backend).unwrap();
    registry.disable_component::<BehaviourComponent>(off, &mut backend).unwrap();
    journal.clear();

    let mut scheduler = FrameScheduler::default();
    let stats = scheduler.run_frame(&mut registry, None, &mut backend, 0.016);

    assert_eq!(journal.entries(), vec!["on:early", "on:update", "on:late"]);
    assert_eq!(stats.components_updated, 1);
    assert!(registry.entity(asleep).is_some());
}

#[test]
fn test_render_pass_uses_camera_and_transform() {
    logging::init_test();
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let teapot = spawn_renderable(&mut registry, "Teapot", Arc::new(Model::triangle()));
    registry.get_component_mut::<TransformComponent>(teapot).unwrap().position = Vec3::new(1.0, 0.0, 0.0);
    let tint = Vec4::new(1.0, 0.5, 0.25, 1.0);
    registry.get_component_mut::<RendererComponent>(teapot).unwrap().set_tint(tint);
    registry.awake_all(&mut backend);

    let mut scheduler = FrameScheduler::new([0.1, 0.2, 0.3, 1.0]);
    let stats = scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert!(stats.rendered);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.renderers_drawn, 1);
    assert_eq!(backend.stats().frames_presented, 1);
    assert_eq!(backend.clear_color(), [0.1, 0.2, 0.3, 1.0]);

    let model = registry.get_component::<TransformComponent>(teapot).unwrap().to_matrix();
    let camera = registry.get_component::<CameraComponent>(camera).unwrap();
    let draw = &backend.frame_draws()[0];
    assert_relative_eq!(draw.uniforms.model, model);
    assert_relative_eq!(
        draw.uniforms.mvp,
        camera.projection_matrix() * camera.view_matrix() * model,
        epsilon = 1e-5
    );
    assert_relative_eq!(draw.uniforms.camera_position, camera.position);

    let diffuse = Model::triangle().sub_meshes[0].material.diffuse;
    assert_relative_eq!(draw.uniforms.base_color, diffuse.component_mul(&tint));
}

#[test]
fn test_missing_transform_draws_with_identity() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let id = registry.create_entity("loose");
    registry.add_component(id, MeshComponent::from_model(Model::triangle())).unwrap();
    registry.add_component(id, RendererComponent::default()).unwrap();
    registry.awake_all(&mut backend);

    FrameScheduler::default().run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert_eq!(backend.frame_draws().len(), 1);
    assert_eq!(backend.frame_draws()[0].uniforms.model, Mat4::identity());
}

#[test]
fn test_disabled_mesh_or_renderer_is_not_drawn() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let hidden_mesh = spawn_renderable(&mut registry, "hidden mesh", Arc::new(Model::triangle()));
    let hidden_renderer = spawn_renderable(&mut registry, "hidden renderer", Arc::new(Model::triangle()));
    let shown = spawn_renderable(&mut registry, "shown", Arc::new(Model::cube()));
    registry.awake_all(&mut backend);
    registry.disable_component::<MeshComponent>(hidden_mesh, &mut backend).unwrap();
    registry.disable_component::<RendererComponent>(hidden_renderer, &mut backend).unwrap();

    let stats = FrameScheduler::default().run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert_eq!(stats.draw_calls, 1);
    let shown_renderer = registry.get_component::<RendererComponent>(shown).unwrap();
    let shown_vao = shown_renderer.cache().resources().next().unwrap().vertex_array;
    assert_eq!(backend.frame_draws()[0].vertex_array, shown_vao);
}

#[test]
fn test_failed_build_is_skipped_at_draw() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let mut model = Model::triangle();
    model.sub_meshes.extend(Model::cube().sub_meshes);
    spawn_renderable(&mut registry, "partial", Arc::new(model));
    backend.fail_next_uploads(1);
    registry.awake_all(&mut backend);

    let stats = FrameScheduler::default().run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert!(stats.rendered);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.sub_meshes_skipped, 1);
}

/// Rotates the sibling transform about +Y
struct Spin {
    radians_per_second: f32,
}

impl Lifecycle for Spin {
    fn update(&mut self, ctx: &mut HookContext<'_>) {
        let angle = self.radians_per_second * ctx.delta_time();
        if let Some(transform) = ctx.sibling_mut::<TransformComponent>() {
            transform.rotate_by(Vec3::y(), angle);
        }
    }
}

impl Behaviour for Spin {
    fn name(&self) -> &str {
        "spin"
    }
}

#[test]
fn test_behaviour_mutates_sibling_before_render() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let id = spawn_renderable(&mut registry, "spinner", Arc::new(Model::triangle()));
    registry
        .add_component(id, BehaviourComponent::new(Spin { radians_per_second: 1.0 }))
        .unwrap();
    registry.awake_all(&mut backend);

    FrameScheduler::default().run_frame(&mut registry, Some(camera), &mut backend, 0.5);

    let transform = registry.get_component::<TransformComponent>(id).unwrap();
    assert_relative_eq!(transform.rotation.angle(), 0.5, epsilon = 1e-5);
    assert_eq!(backend.frame_draws()[0].uniforms.model, transform.to_matrix());
}

/// Disables its sibling renderer and spawns an entity from `update`
struct Retire;

impl Lifecycle for Retire {
    fn update(&mut self, ctx: &mut HookContext<'_>) {
        let id = ctx.entity();
        ctx.commands().disable::<RendererComponent>(id);
        ctx.commands().create_entity("replacement", None);
    }
}

impl Behaviour for Retire {
    fn name(&self) -> &str {
        "retire"
    }
}

#[test]
fn test_commands_apply_after_render() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let id = spawn_renderable(&mut registry, "retiring", Arc::new(Model::triangle()));
    registry.add_component(id, BehaviourComponent::new(Retire)).unwrap();
    registry.awake_all(&mut backend);
    let mut scheduler = FrameScheduler::default();

    let first = scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);
    assert_eq!(first.draw_calls, 1);
    assert_eq!(first.commands_applied, 2);
    assert_eq!(registry.len(), 3);
    assert!(registry.get_component::<RendererComponent>(id).unwrap().cache().is_empty());
    assert!(backend.live_programs().is_empty());

    let second = scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);
    assert_eq!(second.draw_calls, 0);
    assert_eq!(second.frame, 2);
    assert_eq!(registry.query_ids(ComponentKind::Renderer), vec![id]);
}

#[test]
fn test_mesh_added_after_renderer_awake_builds_on_next_frame() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    let id = registry.create_entity("late mesh");
    registry.add_component(id, RendererComponent::default()).unwrap();
    registry.awake_all(&mut backend);
    assert!(registry.get_component::<RendererComponent>(id).unwrap().is_awaiting_mesh());

    registry.add_component(id, MeshComponent::from_model(Model::triangle())).unwrap();
    registry.awake_component::<MeshComponent>(id, &mut backend).unwrap();
    assert_eq!(backend.stats().programs_compiled, 0);

    let stats = FrameScheduler::default().run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert_eq!(backend.stats().programs_compiled, 1);
    assert_eq!(stats.draw_calls, 1);
    let renderer = registry.get_component::<RendererComponent>(id).unwrap();
    assert!(!renderer.is_awaiting_mesh());
    assert_eq!(renderer.cache().len(), 1);
}

#[test]
fn test_renderer_with_mesh_does_not_rebuild_each_frame() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    backend.fail_next_program_builds(1);
    spawn_renderable(&mut registry, "broken", Arc::new(Model::triangle()));
    registry.awake_all(&mut backend);

    let mut scheduler = FrameScheduler::default();
    for _ in 0..3 {
        scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);
    }

    assert_eq!(backend.stats().program_failures, 1);
    assert_eq!(backend.stats().programs_compiled, 0);
}

#[test]
fn test_light_direction_reaches_draw_uniforms() {
    let mut registry = Registry::new();
    let mut backend = HeadlessBackend::new();
    let camera = spawn_camera(&mut registry);
    spawn_renderable(&mut registry, "lit", Arc::new(Model::triangle()));
    registry.awake_all(&mut backend);

    let mut scheduler = FrameScheduler::default();
    scheduler.set_light_direction(Vec3::new(0.0, 0.0, 2.0));
    scheduler.set_light_direction(Vec3::zeros());
    scheduler.run_frame(&mut registry, Some(camera), &mut backend, 0.016);

    assert_relative_eq!(scheduler.light_direction(), Vec3::z());
    assert_relative_eq!(backend.frame_draws()[0].uniforms.light_direction, Vec3::z());
}
