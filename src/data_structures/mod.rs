//! Engine data structures: scene objects, model data, lights and textures.
//!
//! - `bounds` contains axis-aligned bounding boxes used for placement
//! - `instance` holds per-object transformation data and its GPU layout
//! - `light` describes ambient and directional lights
//! - `material` describes surface appearance
//! - `model` contains CPU-side meshes and the node hierarchy of loaded models
//! - `primitives` generates box and plane meshes
//! - `scene_graph` is the append-only store of everything in the scene
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod bounds;
pub mod instance;
pub mod light;
pub mod material;
pub mod model;
pub mod primitives;
pub mod scene_graph;
pub mod texture;
