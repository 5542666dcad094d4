//! Component enumeration and typed access
//!
//! Components form a closed set. Each variant has a [`ComponentKind`] tag that
//! doubles as its slot index in an entity and in the registry's type index.
//! User logic plugs in through the open [`Behaviour`](super::components::Behaviour)
//! variant.

use std::fmt;

use super::components::{
    BehaviourComponent, CameraComponent, MeshComponent, RendererComponent, TransformComponent,
};
use super::inspect::{Inspect, Property};
use super::lifecycle::Lifecycle;

/// Component type tag
///
/// Declaration order is the per-entity update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Spatial placement
    Transform = 0,
    /// View/projection source
    Camera = 1,
    /// Reference to renderable geometry
    Mesh = 2,
    /// Draws the sibling mesh and owns its GPU resources
    Renderer = 3,
    /// User-defined hooks
    Behaviour = 4,
}

impl ComponentKind {
    /// Number of component kinds
    pub const COUNT: usize = 5;

    /// Every kind, in update order
    pub const ALL: [ComponentKind; Self::COUNT] = [
        ComponentKind::Transform,
        ComponentKind::Camera,
        ComponentKind::Mesh,
        ComponentKind::Renderer,
        ComponentKind::Behaviour,
    ];

    /// Slot index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Camera => "Camera",
            ComponentKind::Mesh => "Mesh",
            ComponentKind::Renderer => "Renderer",
            ComponentKind::Behaviour => "Behaviour",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A component of any kind
#[derive(Debug)]
pub enum Component {
    /// Transform variant
    Transform(TransformComponent),
    /// Camera variant
    Camera(CameraComponent),
    /// Mesh variant
    Mesh(MeshComponent),
    /// Renderer variant
    Renderer(RendererComponent),
    /// Behaviour variant
    Behaviour(BehaviourComponent),
}

impl Component {
    /// Type tag of this component
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Camera(_) => ComponentKind::Camera,
            Component::Mesh(_) => ComponentKind::Mesh,
            Component::Renderer(_) => ComponentKind::Renderer,
            Component::Behaviour(_) => ComponentKind::Behaviour,
        }
    }

    /// Inspectable properties of the wrapped component
    pub fn properties(&self) -> Vec<Property> {
        match self {
            Component::Transform(c) => c.properties(),
            Component::Camera(c) => c.properties(),
            Component::Mesh(c) => c.properties(),
            Component::Renderer(c) => c.properties(),
            Component::Behaviour(c) => c.properties(),
        }
    }

    pub(crate) fn lifecycle_mut(&mut self) -> &mut dyn Lifecycle {
        match self {
            Component::Transform(c) => c,
            Component::Camera(c) => c,
            Component::Mesh(c) => c,
            Component::Renderer(c) => c,
            Component::Behaviour(c) => c,
        }
    }
}

/// Statically-typed view of one `Component` variant
pub trait ComponentType: Into<Component> + Sized + 'static {
    /// Tag of the variant this type wraps
    const KIND: ComponentKind;

    /// Borrow the concrete component, if `component` is this variant
    fn from_ref(component: &Component) -> Option<&Self>;

    /// Mutably borrow the concrete component, if `component` is this variant
    fn from_mut(component: &mut Component) -> Option<&mut Self>;

    /// Unwrap the concrete component, handing the original back on mismatch
    fn from_component(component: Component) -> Result<Self, Component>;
}

macro_rules! component_type {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Component {
            fn from(component: $ty) -> Self {
                Component::$variant(component)
            }
        }

        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_ref(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn from_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn from_component(component: Component) -> Result<Self, Component> {
                match component {
                    Component::$variant(c) => Ok(c),
                    other => Err(other),
                }
            }
        }
    };
}

component_type!(TransformComponent, Transform);
component_type!(CameraComponent, Camera);
component_type!(MeshComponent, Mesh);
component_type!(RendererComponent, Renderer);
component_type!(BehaviourComponent, Behaviour);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_index() {
        for (position, kind) in ComponentKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn test_typed_access_rejects_other_variants() {
        let component: Component = TransformComponent::new().into();
        assert_eq!(component.kind(), ComponentKind::Transform);
        assert!(TransformComponent::from_ref(&component).is_some());
        assert!(CameraComponent::from_ref(&component).is_none());

        let back = MeshComponent::from_component(component);
        assert!(matches!(back, Err(Component::Transform(_))));
    }
}
