//! Scene graph store.
//!
//! The [`SceneGraph`] owns every placed object and light for the lifetime of the
//! viewer. It is append-only: objects are added during scene assembly and when
//! model loads complete, and never removed. The renderer relies on this and
//! only uploads the tail of objects it has not seen yet.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::{
    data_structures::{
        bounds::Aabb,
        instance::{self, Instance},
        light::Light,
        material::Appearance,
        model::{MeshData, ModelData},
        primitives::Shape,
    },
    resources::loader::LoadCompletion,
};

/// Index of an object in its [`SceneGraph`]. Stable because nothing is ever removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

#[derive(Clone, Debug)]
pub enum Body {
    Primitive { shape: Shape, appearance: Appearance },
    Model(ModelData),
}

/// A positioned object: a transform, what it looks like, and how it takes part in shadowing.
#[derive(Clone, Debug)]
pub struct VisualObject {
    pub name: String,
    pub transform: Instance,
    pub body: Body,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// One mesh of an object, resolved into world space.
#[derive(Clone, Debug)]
pub struct WorldMesh {
    pub transform: Matrix4<f32>,
    pub mesh: Arc<MeshData>,
    pub appearance: Appearance,
}

impl VisualObject {
    pub fn primitive(name: &str, shape: Shape, appearance: Appearance) -> Self {
        Self {
            name: name.to_string(),
            transform: Instance::new(),
            body: Body::Primitive { shape, appearance },
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Instance) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    /// Every mesh of this object with its world transform and appearance.
    pub fn world_meshes(&self) -> Vec<WorldMesh> {
        match &self.body {
            Body::Primitive { shape, appearance } => vec![WorldMesh {
                transform: self.transform.to_matrix(),
                mesh: Arc::new(shape.mesh()),
                appearance: appearance.clone(),
            }],
            Body::Model(model) => {
                let object = self.transform.to_matrix();
                let mut meshes = Vec::new();
                model.for_each_mesh(&mut |local, mesh| {
                    meshes.push(WorldMesh {
                        transform: object * *local,
                        mesh: mesh.clone(),
                        appearance: model.material(mesh),
                    });
                });
                meshes
            }
        }
    }

    /// Bounding box of all vertices in world space.
    pub fn world_bounds(&self) -> Aabb {
        self.world_meshes()
            .iter()
            .fold(Aabb::empty(), |acc, world| {
                let mesh_bounds = Aabb::from_points(
                    world
                        .mesh
                        .positions()
                        .map(|p| instance::transform_point(&world.transform, p)),
                );
                acc.union(&mesh_bounds)
            })
    }
}

pub struct SceneGraph {
    objects: Vec<VisualObject>,
    lights: Vec<Light>,
    /// Linear RGBA the frame is cleared with.
    pub background: [f32; 4],
}

impl SceneGraph {
    pub fn new(background: [f32; 4]) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            background,
        }
    }

    pub fn add(&mut self, object: VisualObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> &[VisualObject] {
        &self.objects
    }

    /// Objects with an id of at least `start`, in insertion order.
    pub fn objects_from(&self, start: usize) -> impl Iterator<Item = (ObjectId, &VisualObject)> {
        self.objects
            .iter()
            .enumerate()
            .skip(start)
            .map(|(idx, object)| (ObjectId(idx), object))
    }

    pub fn find(&self, name: &str) -> impl Iterator<Item = &VisualObject> {
        self.objects.iter().filter(move |o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Sum of all ambient light radiance.
    pub fn ambient(&self) -> [f32; 3] {
        self.lights
            .iter()
            .filter(|light| matches!(light, Light::Ambient { .. }))
            .map(Light::radiance)
            .fold([0.0; 3], |acc, r| [acc[0] + r[0], acc[1] + r[1], acc[2] + r[2]])
    }

    /// The directional light used for direct lighting and shadows.
    ///
    /// Only the first directional light is rendered; further ones are ignored.
    pub fn sun(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|light| matches!(light, Light::Directional { .. }))
    }

    /// Insert the result of a finished model load.
    ///
    /// A successful load is placed according to its request and added. A failed
    /// load is logged and leaves the scene untouched.
    pub fn apply_load(&mut self, completion: LoadCompletion) -> Option<ObjectId> {
        let LoadCompletion { request, result } = completion;
        match result {
            Ok(model) => {
                let object = request.placement.apply(model);
                let id = self.add(object);
                log::info!("Added {} to the scene as {:?}", request.path, id);
                Some(id)
            }
            Err(err) => {
                log::error!(
                    "An error occurred while loading the model {}: {:#}",
                    request.path,
                    err
                );
                None
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0])
    }
}
