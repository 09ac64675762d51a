//! Floor-level placement of loaded models.
//!
//! A loaded model's origin is arbitrary. Placement measures the model's bounding
//! box and picks the object transform so that, after uniform scaling, the box is
//! centred horizontally on the target and its lowest point rests on the target's
//! height.

use cgmath::{One, Vector3};

use crate::data_structures::{
    bounds::Aabb,
    instance::Instance,
    model::ModelData,
    scene_graph::{Body, VisualObject},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub target: Vector3<f32>,
    pub scale: f32,
}

impl Placement {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            target: Vector3::new(x, y, z),
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Transform that moves `bounds` (in model space) onto the target after scaling.
    pub fn transform_for(&self, bounds: &Aabb) -> Instance {
        let s = self.scale;
        let position = if bounds.is_empty() {
            self.target
        } else {
            let centre = bounds.center();
            Vector3::new(
                self.target.x - s * centre.x,
                self.target.y - s * bounds.min.y,
                self.target.z - s * centre.z,
            )
        };
        Instance {
            position,
            rotation: cgmath::Quaternion::one(),
            scale: Vector3::new(s, s, s),
        }
    }

    /// Wrap `model` into a scene object resting on the target.
    pub fn apply(&self, model: ModelData) -> VisualObject {
        let bounds = model.bounds();
        if bounds.is_empty() {
            log::warn!(
                "Model {} has no geometry, placing its origin at the target",
                model.source
            );
        }
        let transform = self.transform_for(&bounds);
        log::debug!(
            "Placing {} (bounds {:?}..{:?}) at {:?} with scale {}",
            model.source,
            bounds.min,
            bounds.max,
            transform.position,
            self.scale
        );
        VisualObject {
            name: model.source.clone(),
            transform,
            body: Body::Model(model),
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}
