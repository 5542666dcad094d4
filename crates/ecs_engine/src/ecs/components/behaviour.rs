//! User-defined behaviour component
//!
//! The only open variant of the component set. Anything implementing
//! [`Behaviour`] can be attached and receives the full lifecycle.

use std::fmt;

use crate::ecs::inspect::{Inspect, Property, PropertyValue};
use crate::ecs::lifecycle::{HookContext, Lifecycle};

/// Game logic driven by lifecycle hooks
pub trait Behaviour: Lifecycle {
    /// Name shown in inspection reports
    fn name(&self) -> &str;

    /// Extra inspectable properties
    fn properties(&self) -> Vec<Property> {
        Vec::new()
    }
}

/// Boxed [`Behaviour`]
pub struct BehaviourComponent {
    behaviour: Box<dyn Behaviour>,
}

impl BehaviourComponent {
    /// Wrap a behaviour
    pub fn new(behaviour: impl Behaviour + 'static) -> Self {
        Self {
            behaviour: Box::new(behaviour),
        }
    }

    /// Wrapped behaviour
    pub fn behaviour(&self) -> &dyn Behaviour {
        self.behaviour.as_ref()
    }

    /// Wrapped behaviour, mutably
    pub fn behaviour_mut(&mut self) -> &mut dyn Behaviour {
        self.behaviour.as_mut()
    }
}

impl fmt::Debug for BehaviourComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviourComponent")
            .field("name", &self.behaviour.name())
            .finish()
    }
}

impl Lifecycle for BehaviourComponent {
    fn awake(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.awake(ctx);
    }

    fn on_enable(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.on_enable(ctx);
    }

    fn on_disable(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.on_disable(ctx);
    }

    fn early_update(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.early_update(ctx);
    }

    fn update(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.update(ctx);
    }

    fn late_update(&mut self, ctx: &mut HookContext<'_>) {
        self.behaviour.late_update(ctx);
    }
}

impl Inspect for BehaviourComponent {
    fn properties(&self) -> Vec<Property> {
        let mut properties = vec![Property::new("name", PropertyValue::Text(self.behaviour.name().to_string()))];
        properties.extend(Behaviour::properties(self.behaviour.as_ref()));
        properties
    }
}
