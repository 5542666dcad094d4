//! Entity implementation

use std::fmt;

use super::component::{ComponentKind, ComponentType};
use super::lifecycle::ComponentSlot;

/// Entity identifier
///
/// Ids are assigned in creation order starting at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Create an entity id from its raw value
    pub(super) fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw entity id
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Position in the registry's creation-ordered arena
    pub(super) fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identity plus at most one component of each kind
///
/// Entities live in the registry's arena. Parent and child links are ids, so
/// the hierarchy never owns entities.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    slots: [Option<ComponentSlot>; ComponentKind::COUNT],
}

impl Entity {
    pub(super) fn new(id: EntityId, name: String, parent: Option<EntityId>) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name (not required to be unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent entity, if this entity was created as a child
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in creation order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub(super) fn push_child(&mut self, child: EntityId) {
        self.children.push(child);
    }

    /// Whether a component of `kind` is attached
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Kinds of the attached components, in `ComponentKind` order
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Lifecycle slot for `kind`
    pub fn slot(&self, kind: ComponentKind) -> Option<&ComponentSlot> {
        self.slots[kind.index()].as_ref()
    }

    pub(crate) fn slot_mut(&mut self, kind: ComponentKind) -> Option<&mut ComponentSlot> {
        self.slots[kind.index()].as_mut()
    }

    /// Typed component access
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.slot(T::KIND).and_then(|slot| T::from_ref(slot.component()))
    }

    /// Typed mutable component access
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.slot_mut(T::KIND).and_then(|slot| T::from_mut(slot.component_mut()))
    }

    /// Whether the `T` component is attached and currently enabled
    pub fn is_enabled<T: ComponentType>(&self) -> bool {
        self.slot(T::KIND).is_some_and(ComponentSlot::is_enabled)
    }

    /// Detach a slot while one of its hooks runs against the siblings
    pub(crate) fn take_slot(&mut self, kind: ComponentKind) -> Option<ComponentSlot> {
        self.slots[kind.index()].take()
    }

    /// Reattach a slot taken with `take_slot`
    pub(crate) fn put_slot(&mut self, slot: ComponentSlot) {
        let index = slot.kind().index();
        debug_assert!(self.slots[index].is_none(), "slot {} occupied", slot.kind());
        self.slots[index] = Some(slot);
    }
}
