//! A flat scene graph: positioned entities referencing shared models.

use crate::loader::LoadedModel;
use crate::model::Model;
use glam::Mat4;
use std::sync::Arc;

/// A positioned model instance.
///
/// The model reference is optional: an entity with no model (not yet loaded,
/// or its load failed) stays in the scene and is skipped at render time.
#[derive(Clone, Debug, Default)]
pub struct Entity {
    /// World transform. Identity by default.
    pub transform: Mat4,
    /// Shared model, or `None` for an empty placeholder entity.
    pub model: Option<Arc<Model>>,
}

impl Entity {
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            model: Some(model),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

impl From<LoadedModel> for Entity {
    /// An entity positioned by the transform the asset declared.
    fn from(loaded: LoadedModel) -> Self {
        Self {
            transform: loaded.transform,
            model: Some(loaded.model),
        }
    }
}

/// The set of entities drawn each frame, in insertion order.
///
/// Order only affects encoding cost here: all geometry is opaque, so the
/// depth test makes draw order irrelevant to the image.
#[derive(Debug, Default)]
pub struct Scene {
    pub entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_entity_has_identity_transform_and_no_model() {
        let entity = Entity::default();
        assert_eq!(entity.transform, Mat4::IDENTITY);
        assert!(entity.model.is_none());
    }

    #[test]
    fn scene_preserves_insertion_order() {
        let mut scene = Scene::new();
        scene.push(Entity::default().with_transform(Mat4::from_translation(glam::Vec3::X)));
        scene.push(Entity::default().with_transform(Mat4::from_translation(glam::Vec3::Y)));
        assert_eq!(scene.len(), 2);
        assert_eq!(
            scene.entities[0].transform.w_axis.x, 1.0,
            "first pushed entity stays first"
        );
    }
}
