//! Component lifecycle state machine
//!
//! Every attached component sits in a [`ComponentSlot`] that tracks whether it
//! has been awakened and whether it is enabled. Transitions go through the slot
//! so the hook pairing rules hold for every component kind:
//!
//! - `awake` runs once. If the component is enabled at that point it is
//!   followed by `on_enable`.
//! - `on_enable` and `on_disable` only run on a real transition after awake.
//!   Toggling a component that was never awakened just flips its flag.
//! - Per-frame hooks only run while awake and enabled.

use super::commands::CommandQueue;
use super::component::{Component, ComponentKind, ComponentType};
use super::entity::{Entity, EntityId};
use crate::render::RenderBackend;

/// Hooks a component may implement; all default to no-ops
pub trait Lifecycle {
    /// First hook, run once; siblings are present from here on
    fn awake(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Disabled (or freshly awakened) to enabled
    fn on_enable(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Enabled to disabled
    fn on_disable(&mut self, _ctx: &mut HookContext<'_>) {}

    /// First per-frame phase
    fn early_update(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Second per-frame phase
    fn update(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Third per-frame phase
    fn late_update(&mut self, _ctx: &mut HookContext<'_>) {}
}

/// Observable lifecycle state
///
/// Awake is transient: awakening moves a component straight to `Enabled` or
/// `Disabled` depending on its flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Attached but not yet awakened
    Created,
    /// Awakened and enabled; receives per-frame hooks
    Enabled,
    /// Awakened and disabled
    Disabled,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Created => write!(f, "created"),
            LifecycleState::Enabled => write!(f, "enabled"),
            LifecycleState::Disabled => write!(f, "disabled"),
        }
    }
}

/// Everything a hook may touch while it runs
///
/// The context has no path back to the registry. Structural
/// changes are recorded on [`commands`](Self::commands) and applied once the
/// frame's traversal is over.
pub struct HookContext<'a> {
    entity: &'a mut Entity,
    backend: &'a mut dyn RenderBackend,
    commands: &'a mut CommandQueue,
    delta_time: f32,
}

impl<'a> HookContext<'a> {
    /// Build a context around `entity`, whose slot for the running hook is detached
    pub(crate) fn new(
        entity: &'a mut Entity,
        backend: &'a mut dyn RenderBackend,
        commands: &'a mut CommandQueue,
        delta_time: f32,
    ) -> Self {
        Self {
            entity,
            backend,
            commands,
            delta_time,
        }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity.id()
    }

    /// Owning entity's name
    pub fn entity_name(&self) -> &str {
        self.entity.name()
    }

    /// Sibling component on the owning entity
    pub fn sibling<T: ComponentType>(&self) -> Option<&T> {
        self.entity.get::<T>()
    }

    /// Mutable sibling component on the owning entity
    pub fn sibling_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.entity.get_mut::<T>()
    }

    /// Whether a sibling of type `T` is attached and enabled
    pub fn sibling_enabled<T: ComponentType>(&self) -> bool {
        self.entity.is_enabled::<T>()
    }

    /// Rendering backend
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Siblings and backend at the same time
    pub fn siblings_and_backend(&mut self) -> (&Entity, &mut dyn RenderBackend) {
        (&*self.entity, &mut *self.backend)
    }

    /// Queue for structural changes applied after the traversal
    pub fn commands(&mut self) -> &mut CommandQueue {
        &mut *self.commands
    }

    /// Seconds since the previous frame; zero outside the frame loop
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}

/// A component plus its lifecycle bookkeeping
#[derive(Debug)]
pub struct ComponentSlot {
    component: Component,
    owner: EntityId,
    enabled: bool,
    awakened: bool,
}

impl ComponentSlot {
    pub(crate) fn new(component: Component, owner: EntityId) -> Self {
        Self {
            component,
            owner,
            enabled: true,
            awakened: false,
        }
    }

    /// Tag of the held component
    pub fn kind(&self) -> ComponentKind {
        self.component.kind()
    }

    /// Entity the component is attached to
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Held component
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Held component, mutably
    pub fn component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    /// Enabled flag (true by default)
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `awake` has run
    pub fn is_awake(&self) -> bool {
        self.awakened
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        match (self.awakened, self.enabled) {
            (false, _) => LifecycleState::Created,
            (true, true) => LifecycleState::Enabled,
            (true, false) => LifecycleState::Disabled,
        }
    }

    pub(crate) fn into_component(self) -> Component {
        self.component
    }

    /// Run `awake`, then `on_enable` if enabled. Returns false if already awake.
    pub(crate) fn awake(&mut self, ctx: &mut HookContext<'_>) -> bool {
        if self.awakened {
            log::warn!("{} on entity {} is already awake", self.kind(), self.owner);
            return false;
        }
        log::trace!("awake {} on entity {}", self.kind(), self.owner);
        self.awakened = true;
        self.component.lifecycle_mut().awake(ctx);
        if self.enabled {
            self.component.lifecycle_mut().on_enable(ctx);
        }
        true
    }

    /// Enable the component. Returns true if the flag changed.
    pub(crate) fn enable(&mut self, ctx: &mut HookContext<'_>) -> bool {
        if self.enabled {
            return false;
        }
        if self.awakened {
            log::trace!("on_enable {} on entity {}", self.kind(), self.owner);
            self.component.lifecycle_mut().on_enable(ctx);
        }
        self.enabled = true;
        true
    }

    /// Disable the component. Returns true if the flag changed.
    pub(crate) fn disable(&mut self, ctx: &mut HookContext<'_>) -> bool {
        if !self.enabled {
            return false;
        }
        if self.awakened {
            log::trace!("on_disable {} on entity {}", self.kind(), self.owner);
            self.component.lifecycle_mut().on_disable(ctx);
        }
        self.enabled = false;
        true
    }

    /// Run the three per-frame phases back to back
    pub(crate) fn run_update(&mut self, ctx: &mut HookContext<'_>) {
        let lifecycle = self.component.lifecycle_mut();
        lifecycle.early_update(ctx);
        lifecycle.update(ctx);
        lifecycle.late_update(ctx);
    }
}
