//! Typed property reports for entity inspection
//!
//! Each component describes itself as a list of named [`Property`] values.
//! [`EntityReport`] gathers them per entity for tools and logs.

use std::fmt;

use super::component::ComponentKind;
use super::entity::EntityId;
use super::lifecycle::LifecycleState;
use crate::foundation::math::{Vec3, Vec4};

/// Value of an inspectable property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Flag
    Bool(bool),
    /// Scalar
    Float(f32),
    /// Vector
    Vec3(Vec3),
    /// RGBA color
    Color(Vec4),
    /// Free text
    Text(String),
    /// Count of something
    Count(usize),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{:.3}", v),
            PropertyValue::Vec3(v) => write!(f, "({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
            PropertyValue::Color(c) => write!(f, "rgba({:.2}, {:.2}, {:.2}, {:.2})", c.x, c.y, c.z, c.w),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Count(n) => write!(f, "{}", n),
        }
    }
}

/// A named property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name
    pub name: &'static str,
    /// Current value
    pub value: PropertyValue,
}

impl Property {
    /// Create a property
    pub fn new(name: &'static str, value: PropertyValue) -> Self {
        Self { name, value }
    }
}

/// Components that can describe their state
pub trait Inspect {
    /// Current property values; empty by default
    fn properties(&self) -> Vec<Property> {
        Vec::new()
    }
}

/// One component's section of an [`EntityReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReport {
    /// Component kind
    pub kind: ComponentKind,
    /// Lifecycle state at inspection time
    pub state: LifecycleState,
    /// Property values
    pub properties: Vec<Property>,
}

impl ComponentReport {
    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Snapshot of an entity and its components
#[derive(Debug, Clone, PartialEq)]
pub struct EntityReport {
    /// Entity id
    pub id: EntityId,
    /// Entity name
    pub name: String,
    /// Parent id
    pub parent: Option<EntityId>,
    /// Child ids in creation order
    pub children: Vec<EntityId>,
    /// Components in kind order
    pub components: Vec<ComponentReport>,
}

impl EntityReport {
    /// Section for `kind`, if the entity has that component
    pub fn component(&self, kind: ComponentKind) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.kind == kind)
    }
}

impl fmt::Display for EntityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} '{}'", self.id, self.name)?;
        if let Some(parent) = self.parent {
            writeln!(f, "  parent: {}", parent)?;
        }
        for component in &self.components {
            writeln!(f, "  [{}] {}", component.kind, component.state)?;
            for property in &component.properties {
                writeln!(f, "    {:<18} {}", property.name, property.value)?;
            }
        }
        Ok(())
    }
}
