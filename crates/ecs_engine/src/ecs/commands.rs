//! Deferred structural changes
//!
//! Hooks cannot reach the registry while the frame traverses it. Instead they
//! record [`DeferredCommand`]s, which the registry applies in recording order
//! once the traversal is finished.

use super::component::{Component, ComponentKind, ComponentType};
use super::entity::EntityId;

/// A registry mutation recorded during traversal
#[derive(Debug)]
pub enum DeferredCommand {
    /// Enable a component
    Enable {
        /// Target entity
        entity: EntityId,
        /// Component to enable
        kind: ComponentKind,
    },

    /// Disable a component
    Disable {
        /// Target entity
        entity: EntityId,
        /// Component to disable
        kind: ComponentKind,
    },

    /// Attach a component
    ///
    /// The component is not awakened; issue [`Awake`](Self::Awake) after it.
    Add {
        /// Target entity
        entity: EntityId,
        /// Component to attach
        component: Component,
    },

    /// Awaken every component of an entity that is not awake yet
    Awake {
        /// Target entity
        entity: EntityId,
    },

    /// Detach a component, disabling it first so its resources are released
    Remove {
        /// Target entity
        entity: EntityId,
        /// Component to remove
        kind: ComponentKind,
    },

    /// Create an entity, optionally as a child
    CreateEntity {
        /// Display name
        name: String,
        /// Parent entity
        parent: Option<EntityId>,
    },
}

/// Ordered buffer of deferred commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<DeferredCommand>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command
    pub fn push(&mut self, command: DeferredCommand) {
        self.commands.push(command);
    }

    /// Record enabling the `T` component of `entity`
    pub fn enable<T: ComponentType>(&mut self, entity: EntityId) {
        self.push(DeferredCommand::Enable { entity, kind: T::KIND });
    }

    /// Record disabling the `T` component of `entity`
    pub fn disable<T: ComponentType>(&mut self, entity: EntityId) {
        self.push(DeferredCommand::Disable { entity, kind: T::KIND });
    }

    /// Record attaching `component` to `entity`
    pub fn add(&mut self, entity: EntityId, component: impl Into<Component>) {
        self.push(DeferredCommand::Add {
            entity,
            component: component.into(),
        });
    }

    /// Record awakening `entity`
    pub fn awake(&mut self, entity: EntityId) {
        self.push(DeferredCommand::Awake { entity });
    }

    /// Record removing the `T` component of `entity`
    pub fn remove<T: ComponentType>(&mut self, entity: EntityId) {
        self.push(DeferredCommand::Remove { entity, kind: T::KIND });
    }

    /// Record creating an entity
    pub fn create_entity(&mut self, name: impl Into<String>, parent: Option<EntityId>) {
        self.push(DeferredCommand::CreateEntity {
            name: name.into(),
            parent,
        });
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every recorded command, leaving the queue empty
    pub fn take(&mut self) -> Vec<DeferredCommand> {
        std::mem::take(&mut self.commands)
    }
}
