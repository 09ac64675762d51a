//! room-viewer
//!
//! Renders a small furnished room: a floor, three walls and a door built from
//! primitives, plus a building model and four trees loaded from glTF files. The
//! camera orbits the room with damped mouse and touch controls. Runs natively
//! in a window and in the browser on WebGL2.
//!
//! High-level modules
//! - `app`: the winit application, event routing and `run`
//! - `camera`: camera, projection and the camera uniform
//! - `config`: asset root, canvas id and window title
//! - `context`: GPU device, surface and shared GPU resources
//! - `controls`: orbit controls with damping
//! - `data_structures`: scene graph, objects, models, materials, lights and textures
//! - `frame`: the self-rescheduling frame loop
//! - `pipelines`: lit and shadow render pipelines
//! - `placement`: floor-level placement of loaded models
//! - `render`: uploads the scene graph and draws it
//! - `resources`: asset fetching, glTF parsing and async loads
//! - `scene`: the room's fixed contents
//! - `viewport`: output size and pixel ratio bookkeeping
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod frame;
pub mod pipelines;
pub mod placement;
pub mod render;
pub mod resources;
pub mod scene;
pub mod viewport;

pub use app::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
