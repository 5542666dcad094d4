//! Mesh component: a shared reference to imported geometry

use std::sync::Arc;

use crate::assets::{Model, SubMesh};
use crate::ecs::inspect::{Inspect, Property, PropertyValue};
use crate::ecs::lifecycle::Lifecycle;

/// Reference to a model's sub-meshes
///
/// Cloning shares the same sub-mesh allocations, so renderers on both clones
/// key their caches on the same identities.
#[derive(Debug, Clone)]
pub struct MeshComponent {
    model: Arc<Model>,
}

impl MeshComponent {
    /// Reference a shared model
    pub fn new(model: Arc<Model>) -> Self {
        Self { model }
    }

    /// Take ownership of a model
    pub fn from_model(model: Model) -> Self {
        Self::new(Arc::new(model))
    }

    /// Referenced model
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Drawable pieces in source order
    pub fn sub_meshes(&self) -> &[Arc<SubMesh>] {
        &self.model.sub_meshes
    }
}

impl Lifecycle for MeshComponent {}

impl Inspect for MeshComponent {
    fn properties(&self) -> Vec<Property> {
        let source = self
            .model
            .source
            .as_ref()
            .map_or_else(|| "<built-in>".to_string(), |path| path.display().to_string());
        vec![
            Property::new("source", PropertyValue::Text(source)),
            Property::new("sub_meshes", PropertyValue::Count(self.model.sub_meshes.len())),
            Property::new("triangles", PropertyValue::Count(self.model.triangle_count())),
        ]
    }
}
