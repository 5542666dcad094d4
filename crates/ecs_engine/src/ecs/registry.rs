//! Entity registry
//!
//! Owns every entity in creation order and keeps a per-kind index of which
//! entities hold which component. Lifecycle transitions are driven from here
//! because a hook needs its owning entity (for siblings) and the backend at
//! the same time.

use std::collections::BTreeSet;

use thiserror::Error;

use super::commands::{CommandQueue, DeferredCommand};
use super::component::{Component, ComponentKind, ComponentType};
use super::entity::{Entity, EntityId};
use super::inspect::{ComponentReport, EntityReport};
use super::lifecycle::{ComponentSlot, HookContext, LifecycleState};
use crate::render::RenderBackend;

/// Registry operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The entity already has a component of this kind
    #[error("Entity {entity} already has a {kind} component")]
    DuplicateComponent {
        /// Target entity
        entity: EntityId,
        /// Kind already present
        kind: ComponentKind,
    },

    /// No entity with this id
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// The entity has no component of this kind
    #[error("Entity {entity} has no {kind} component")]
    ComponentNotFound {
        /// Target entity
        entity: EntityId,
        /// Missing kind
        kind: ComponentKind,
    },
}

impl RegistryError {
    /// Whether this is one of the not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound(_) | Self::ComponentNotFound { .. })
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Entity arena plus type index
#[derive(Debug)]
pub struct Registry {
    next_entity_id: u32,
    entities: Vec<Entity>,
    type_index: [BTreeSet<EntityId>; ComponentKind::COUNT],
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_entity_id: 1,
            entities: Vec::new(),
            type_index: std::array::from_fn(|_| BTreeSet::new()),
        }
    }

    /// Create a root entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.spawn(name.into(), None)
    }

    /// Create an entity as the last child of `parent`
    pub fn create_child(&mut self, parent: EntityId, name: impl Into<String>) -> RegistryResult<EntityId> {
        if !self.contains(parent) {
            return Err(RegistryError::EntityNotFound(parent));
        }
        let child = self.spawn(name.into(), Some(parent));
        if let Some(entity) = self.entities.get_mut(parent.index()) {
            entity.push_child(child);
        }
        Ok(child)
    }

    fn spawn(&mut self, name: String, parent: Option<EntityId>) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        log::debug!("Created entity {} '{}'", id, name);
        self.entities.push(Entity::new(id, name, parent));
        id
    }

    /// Whether `id` names a live entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index()).filter(|entity| entity.id() == id)
    }

    /// Entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity was created yet
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Attach `component` to `entity`
    ///
    /// The component starts enabled but not awake.
    pub fn add_component<T: ComponentType>(&mut self, entity: EntityId, component: T) -> RegistryResult<()> {
        self.insert_component(entity, component.into())
    }

    fn insert_component(&mut self, id: EntityId, component: Component) -> RegistryResult<()> {
        let kind = component.kind();
        let entity = self
            .entities
            .get_mut(id.index())
            .ok_or(RegistryError::EntityNotFound(id))?;
        if entity.has(kind) {
            return Err(RegistryError::DuplicateComponent { entity: id, kind });
        }
        entity.put_slot(ComponentSlot::new(component, id));
        self.type_index[kind.index()].insert(id);
        log::trace!("Added {} to entity {}", kind, id);
        Ok(())
    }

    /// Detach and return the `T` component of `entity`
    ///
    /// No hook runs. Disable the component first if it holds resources.
    pub fn remove_component<T: ComponentType>(&mut self, entity: EntityId) -> RegistryResult<T> {
        let component = self.remove_component_kind(entity, T::KIND)?;
        T::from_component(component).map_err(|_| RegistryError::ComponentNotFound { entity, kind: T::KIND })
    }

    /// Untyped form of [`remove_component`](Self::remove_component)
    pub fn remove_component_kind(&mut self, id: EntityId, kind: ComponentKind) -> RegistryResult<Component> {
        let entity = self
            .entities
            .get_mut(id.index())
            .ok_or(RegistryError::EntityNotFound(id))?;
        let slot = entity
            .take_slot(kind)
            .ok_or(RegistryError::ComponentNotFound { entity: id, kind })?;
        self.type_index[kind.index()].remove(&id);
        log::trace!("Removed {} from entity {}", kind, id);
        Ok(slot.into_component())
    }

    /// Borrow the `T` component of `entity`
    pub fn get_component<T: ComponentType>(&self, entity: EntityId) -> Option<&T> {
        self.entity(entity)?.get::<T>()
    }

    /// Mutably borrow the `T` component of `entity`
    pub fn get_component_mut<T: ComponentType>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities.get_mut(entity.index())?.get_mut::<T>()
    }

    /// Lifecycle state of a component
    pub fn component_state(&self, entity: EntityId, kind: ComponentKind) -> Option<LifecycleState> {
        self.entity(entity)?.slot(kind).map(ComponentSlot::state)
    }

    /// Every `T` component with its entity, in creation order
    pub fn query<T: ComponentType>(&self) -> Vec<(EntityId, &T)> {
        self.type_index[T::KIND.index()]
            .iter()
            .filter_map(|id| self.get_component::<T>(*id).map(|component| (*id, component)))
            .collect()
    }

    /// Ids of the entities holding a `kind` component, in creation order
    pub fn query_ids(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.type_index[kind.index()].iter().copied().collect()
    }

    /// Whether the type index matches the entities' component sets
    pub fn is_index_consistent(&self) -> bool {
        ComponentKind::ALL.iter().all(|kind| {
            let holders: BTreeSet<EntityId> = self
                .entities
                .iter()
                .filter(|entity| entity.has(*kind))
                .map(Entity::id)
                .collect();
            holders == self.type_index[kind.index()]
        })
    }

    /// All descendants of `id`, depth-first pre-order
    pub fn descendants(&self, id: EntityId) -> RegistryResult<Vec<EntityId>> {
        let root = self.entity(id).ok_or(RegistryError::EntityNotFound(id))?;
        let mut result = Vec::new();
        let mut stack: Vec<EntityId> = root.children().iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            if let Some(entity) = self.entity(next) {
                stack.extend(entity.children().iter().rev());
            }
        }
        Ok(result)
    }

    /// Snapshot an entity's components and their properties
    pub fn inspect(&self, id: EntityId) -> RegistryResult<EntityReport> {
        let entity = self.entity(id).ok_or(RegistryError::EntityNotFound(id))?;
        let components = entity
            .kinds()
            .filter_map(|kind| entity.slot(kind))
            .map(|slot| ComponentReport {
                kind: slot.kind(),
                state: slot.state(),
                properties: slot.component().properties(),
            })
            .collect();
        Ok(EntityReport {
            id,
            name: entity.name().to_string(),
            parent: entity.parent(),
            children: entity.children().to_vec(),
            components,
        })
    }

    /// Awaken the `T` component of `entity`. Returns false if it was already awake.
    pub fn awake_component<T: ComponentType>(&mut self, entity: EntityId, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.awake_kind(entity, T::KIND, backend)
    }

    /// Enable the `T` component of `entity`. Returns false if it was already enabled.
    pub fn enable_component<T: ComponentType>(&mut self, entity: EntityId, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.enable_kind(entity, T::KIND, backend)
    }

    /// Disable the `T` component of `entity`. Returns false if it was already disabled.
    pub fn disable_component<T: ComponentType>(&mut self, entity: EntityId, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.disable_kind(entity, T::KIND, backend)
    }

    /// Untyped form of [`awake_component`](Self::awake_component)
    pub fn awake_kind(&mut self, entity: EntityId, kind: ComponentKind, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.with_slot(entity, kind, backend, |slot, ctx| slot.awake(ctx))
    }

    /// Untyped form of [`enable_component`](Self::enable_component)
    pub fn enable_kind(&mut self, entity: EntityId, kind: ComponentKind, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.with_slot(entity, kind, backend, |slot, ctx| slot.enable(ctx))
    }

    /// Untyped form of [`disable_component`](Self::disable_component)
    pub fn disable_kind(&mut self, entity: EntityId, kind: ComponentKind, backend: &mut dyn RenderBackend) -> RegistryResult<bool> {
        self.with_slot(entity, kind, backend, |slot, ctx| slot.disable(ctx))
    }

    /// Awaken every component of `entity` that is not awake yet, in kind order
    ///
    /// Returns how many components were awakened.
    pub fn awake_entity(&mut self, id: EntityId, backend: &mut dyn RenderBackend) -> RegistryResult<usize> {
        let entity = self.entity(id).ok_or(RegistryError::EntityNotFound(id))?;
        let pending: Vec<ComponentKind> = entity
            .kinds()
            .filter(|kind| entity.slot(*kind).is_some_and(|slot| !slot.is_awake()))
            .collect();

        let mut awakened = 0;
        for kind in pending {
            if self.awake_kind(id, kind, backend)? {
                awakened += 1;
            }
        }
        Ok(awakened)
    }

    /// Awaken every pending component of every entity, in creation order
    pub fn awake_all(&mut self, backend: &mut dyn RenderBackend) -> usize {
        let ids: Vec<EntityId> = self.entities.iter().map(Entity::id).collect();
        let mut awakened = 0;
        for id in ids {
            match self.awake_entity(id, backend) {
                Ok(count) => awakened += count,
                Err(e) => log::warn!("Failed to awake entity {}: {}", id, e),
            }
        }
        log::info!("Awakened {} components across {} entities", awakened, self.entities.len());
        awakened
    }

    /// Apply recorded commands in order, returning how many succeeded
    ///
    /// A failing command is logged and skipped.
    pub fn apply_commands(&mut self, queue: &mut CommandQueue, backend: &mut dyn RenderBackend) -> usize {
        let mut applied = 0;
        for command in queue.take() {
            log::trace!("Applying {:?}", command);
            let result = match command {
                DeferredCommand::Enable { entity, kind } => self.enable_kind(entity, kind, backend).map(drop),
                DeferredCommand::Disable { entity, kind } => self.disable_kind(entity, kind, backend).map(drop),
                DeferredCommand::Add { entity, component } => self.insert_component(entity, component),
                DeferredCommand::Awake { entity } => self.awake_entity(entity, backend).map(drop),
                DeferredCommand::Remove { entity, kind } => self
                    .disable_kind(entity, kind, backend)
                    .and_then(|_| self.remove_component_kind(entity, kind))
                    .map(drop),
                DeferredCommand::CreateEntity { name, parent: Some(parent) } => {
                    self.create_child(parent, name).map(drop)
                }
                DeferredCommand::CreateEntity { name, parent: None } => {
                    self.create_entity(name);
                    Ok(())
                }
            };
            match result {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Deferred command failed: {}", e),
            }
        }
        applied
    }

    /// Run `f` on a detached slot with a hook context over its entity
    ///
    /// Commands recorded by the hook are applied once the slot is back in place.
    fn with_slot<R>(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
        backend: &mut dyn RenderBackend,
        f: impl FnOnce(&mut ComponentSlot, &mut HookContext<'_>) -> R,
    ) -> RegistryResult<R> {
        let entity = self
            .entities
            .get_mut(id.index())
            .ok_or(RegistryError::EntityNotFound(id))?;
        let mut slot = entity
            .take_slot(kind)
            .ok_or(RegistryError::ComponentNotFound { entity: id, kind })?;

        let mut commands = CommandQueue::new();
        let result = {
            let mut ctx = HookContext::new(entity, &mut *backend, &mut commands, 0.0);
            f(&mut slot, &mut ctx)
        };
        entity.put_slot(slot);

        if !commands.is_empty() {
            self.apply_commands(&mut commands, backend);
        }
        Ok(result)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
