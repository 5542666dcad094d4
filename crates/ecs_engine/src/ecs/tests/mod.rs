//! Integration tests for the registry, lifecycle, resource caching and frame loop
//!
//! Shared fixtures live here; scenarios are grouped by concern.

mod frame_integration;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::assets::Model;
use crate::core::config::CameraConfig;
use crate::ecs::{
    Behaviour, BehaviourComponent, CameraComponent, EntityId, HookContext, Lifecycle, MeshComponent, Registry,
    RendererComponent, TransformComponent,
};
use crate::foundation::math::Vec3;

/// Shared log of hook invocations
#[derive(Debug, Clone, Default)]
pub(super) struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub(super) fn record(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub(super) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub(super) fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }

    pub(super) fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Behaviour that records every hook as `label:hook`
pub(super) struct Recorder {
    label: String,
    journal: Journal,
}

impl Recorder {
    pub(super) fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: journal.clone(),
        }
    }

    fn record(&self, hook: &str) {
        self.journal.record(format!("{}:{}", self.label, hook));
    }
}

impl Lifecycle for Recorder {
    fn awake(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("awake");
    }

    fn on_enable(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("enable");
    }

    fn on_disable(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("disable");
    }

    fn early_update(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("early");
    }

    fn update(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("update");
    }

    fn late_update(&mut self, _ctx: &mut HookContext<'_>) {
        self.record("late");
    }
}

impl Behaviour for Recorder {
    fn name(&self) -> &str {
        &self.label
    }
}

/// Entity with Transform, Mesh and Renderer over `model`, not yet awake
pub(super) fn spawn_renderable(registry: &mut Registry, name: &str, model: Arc<Model>) -> EntityId {
    let id = registry.create_entity(name);
    registry.add_component(id, TransformComponent::new()).unwrap();
    registry.add_component(id, MeshComponent::new(model)).unwrap();
    registry.add_component(id, RendererComponent::default()).unwrap();
    id
}

/// Camera entity five units behind the origin looking down +Z, not yet awake
pub(super) fn spawn_camera(registry: &mut Registry) -> EntityId {
    let id = registry.create_entity("Camera");
    let camera = CameraComponent::new(Vec3::new(0.0, 0.0, -5.0), &CameraConfig::default(), 1.0);
    registry.add_component(id, camera).unwrap();
    id
}

/// Entity carrying only a recording behaviour, not yet awake
pub(super) fn spawn_recorder(registry: &mut Registry, label: &str, journal: &Journal) -> EntityId {
    let id = registry.create_entity(label);
    registry
        .add_component(id, BehaviourComponent::new(Recorder::new(label, journal)))
        .unwrap();
    id
}
