//! The room: fixed geometry, lights, camera start and the models to load.

use std::{f32::consts::FRAC_PI_2, iter};

use cgmath::{Deg, Point3, Rad};

use crate::{
    camera::{Camera, Projection},
    controls::OrbitControls,
    data_structures::{
        instance::Instance,
        light::{Light, ShadowCamera},
        material::{Appearance, hex_to_linear},
        primitives::Shape,
        scene_graph::{SceneGraph, VisualObject},
    },
    placement::Placement,
    resources::loader::LoadRequest,
    viewport::Viewport,
};

/// Clear colour, lemon chiffon.
pub const BACKGROUND: u32 = 0xFFFACD;
pub const FLOOR_COLOUR: u32 = 0x88AFA5;
pub const WALL_COLOUR: u32 = 0x8B4513;

pub const BUILDING_MODEL: &str = "models/scene.gltf";
pub const TREE_MODEL: &str = "Tree/scene.gltf";
pub const TREE_SCALE: f32 = 5.0;
/// Floor positions of the trees, one per corner of the room.
pub const TREE_POSITIONS: [[f32; 3]; 4] = [
    [-9.0, 0.0, -14.0],
    [9.0, 0.0, -14.0],
    [9.0, 0.0, 12.0],
    [-9.0, 0.0, 14.0],
];

pub const CAMERA_POSITION: [f32; 3] = [5.0, 2.0, 8.0];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 0.75, 0.0];
pub const FOV_DEGREES: f32 = 50.0;
pub const ZNEAR: f32 = 0.1;
pub const ZFAR: f32 = 100.0;
pub const DAMPING: f32 = 0.05;

/// An empty scene graph with the room's background colour.
pub fn new_scene() -> SceneGraph {
    SceneGraph::new(hex_to_linear(BACKGROUND))
}

/// Add the floor, walls, door and lights.
pub fn assemble(scene: &mut SceneGraph) {
    scene.add(
        VisualObject::primitive(
            "floor",
            Shape::Plane {
                width: 20.0,
                height: 30.0,
            },
            Appearance::from_hex(FLOOR_COLOUR)
                .with_metalness(0.0)
                .with_roughness(0.5),
        )
        .with_transform(Instance::new().rotated_x(Rad(-FRAC_PI_2)))
        .receiving_shadow(),
    );

    let wall = Appearance::from_hex(WALL_COLOUR);
    scene.add(
        VisualObject::primitive(
            "left wall",
            Shape::Box {
                width: 0.1,
                height: 5.0,
                depth: 30.0,
            },
            wall.clone(),
        )
        .with_transform(Instance::at(-10.0, 2.5, 0.0)),
    );
    scene.add(
        VisualObject::primitive(
            "front wall",
            Shape::Box {
                width: 20.0,
                height: 5.0,
                depth: 0.1,
            },
            wall.clone(),
        )
        .with_transform(Instance::at(0.0, 2.5, -15.0)),
    );
    scene.add(
        VisualObject::primitive(
            "back wall",
            Shape::Box {
                width: 20.0,
                height: 5.0,
                depth: 0.1,
            },
            wall.clone(),
        )
        .with_transform(Instance::at(0.0, 2.5, 15.0)),
    );
    // The room has no wall at x = 10.

    scene.add(
        VisualObject::primitive(
            "door",
            Shape::Box {
                width: 1.9,
                height: 3.3,
                depth: 0.1,
            },
            wall,
        )
        .with_transform(Instance::at(5.0, 1.1, 6.8).rotated_y(Rad(0.1)))
        .casting_shadow(),
    );

    scene.add_light(Light::Ambient {
        colour: [1.0, 1.0, 1.0],
        intensity: 2.4,
    });
    scene.add_light(Light::Directional {
        colour: [1.0, 1.0, 1.0],
        intensity: 1.8,
        position: Point3::new(5.0, 5.0, 5.0),
        target: Point3::new(0.0, 0.0, 0.0),
        shadow: Some(ShadowCamera {
            left: -7.0,
            right: 7.0,
            top: 7.0,
            bottom: -7.0,
            near: 0.5,
            far: 15.0,
            map_size: 1024,
        }),
    });
}

/// The building at the origin and one tree per corner.
pub fn load_requests() -> Vec<LoadRequest> {
    let building = LoadRequest::new(BUILDING_MODEL, Placement::default());
    let trees = TREE_POSITIONS.iter().map(|&[x, y, z]| {
        LoadRequest::new(TREE_MODEL, Placement::at(x, y, z).with_scale(TREE_SCALE))
    });
    iter::once(building).chain(trees).collect()
}

pub fn initial_camera() -> Camera {
    Camera::new(CAMERA_POSITION, CAMERA_TARGET)
}

pub fn initial_controls() -> OrbitControls {
    OrbitControls::new(CAMERA_TARGET).with_damping(DAMPING)
}

/// Lens matching the viewport's aspect ratio.
pub fn initial_projection(viewport: &Viewport) -> Projection {
    let mut projection = Projection::new(1, 1, Deg(FOV_DEGREES), ZNEAR, ZFAR);
    projection.set_aspect(viewport.width() as f32, viewport.height() as f32);
    projection
}
