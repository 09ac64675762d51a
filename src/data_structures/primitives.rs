//! Procedural primitives: boxes and planes centred on their local origin.

use cgmath::Vector3;

use crate::data_structures::model::{MeshData, ModelVertex};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Box with the given extents along x, y and z.
    Box { width: f32, height: f32, depth: f32 },
    /// Plane in the local XY plane facing +Z, `width` along x and `height` along y.
    Plane { width: f32, height: f32 },
}

impl Shape {
    pub fn mesh(&self) -> MeshData {
        let mut mesh = MeshData {
            name: self.label().to_string(),
            ..Default::default()
        };
        match *self {
            Shape::Box {
                width,
                height,
                depth,
            } => {
                let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
                let x = Vector3::unit_x();
                let y = Vector3::unit_y();
                let z = Vector3::unit_z();
                push_face(&mut mesh, x, -z, y, hx, hz, hy);
                push_face(&mut mesh, -x, z, y, hx, hz, hy);
                push_face(&mut mesh, y, x, -z, hy, hx, hz);
                push_face(&mut mesh, -y, x, z, hy, hx, hz);
                push_face(&mut mesh, z, x, y, hz, hx, hy);
                push_face(&mut mesh, -z, -x, y, hz, hx, hy);
            }
            Shape::Plane { width, height } => {
                push_face(
                    &mut mesh,
                    Vector3::unit_z(),
                    Vector3::unit_x(),
                    Vector3::unit_y(),
                    0.0,
                    width * 0.5,
                    height * 0.5,
                );
            }
        }
        mesh
    }

    fn label(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Plane { .. } => "plane",
        }
    }
}

/// Append one quad with outward `normal`, spanned by `u` and `v` (`u × v == normal`)
/// so it winds counter-clockwise seen from the front.
fn push_face(
    mesh: &mut MeshData,
    normal: Vector3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    offset: f32,
    half_u: f32,
    half_v: f32,
) {
    let base = mesh.vertices.len() as u32;
    let centre = normal * offset;
    let corners = [
        (-1.0, -1.0, [0.0, 1.0]),
        (1.0, -1.0, [1.0, 1.0]),
        (1.0, 1.0, [1.0, 0.0]),
        (-1.0, 1.0, [0.0, 0.0]),
    ];
    for (su, sv, tex_coords) in corners {
        let position = centre + u * (su * half_u) + v * (sv * half_v);
        mesh.vertices.push(ModelVertex {
            position: position.into(),
            tex_coords,
            normal: normal.into(),
        });
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
