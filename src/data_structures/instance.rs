//! Transformation data for scene objects and the GPU instance layout.
//!
//! Placed objects carry an [`Instance`] (translation, rotation, scale). Node
//! hierarchies of loaded models are composed as full matrices, since a rotated
//! child under a non-uniformly scaled parent is not a TRS transform any more.
//! Before drawing, the world matrix of each mesh is packed into an
//! [`InstanceRaw`] and uploaded as a per-instance vertex buffer.

use cgmath::{Matrix, Matrix3, Matrix4, One, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Position, rotation (as quaternion) and scale of an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// The identity transform.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Vector3::new(x, y, z).into()
    }

    pub fn rotated_x(mut self, angle: Rad<f32>) -> Self {
        self.rotation = self.rotation * Quaternion::from_angle_x(angle);
        self
    }

    pub fn rotated_y(mut self, angle: Rad<f32>) -> Self {
        self.rotation = self.rotation * Quaternion::from_angle_y(angle);
        self
    }

    /// Translation * rotation * scale.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply an affine `matrix` to a point.
pub fn transform_point(matrix: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
    (*matrix * point.extend(1.0)).truncate()
}

/// Inverse transpose of the upper 3x3 of `model`, so normals stay perpendicular
/// to surfaces under non-uniform scale.
///
/// A singular matrix (a zero scale axis) keeps its upper 3x3; the shader
/// renormalises anyway.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

/// World matrix and normal matrix as laid out in the instance vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    pub fn from_matrix(model: Matrix4<f32>) -> Self {
        Self {
            model: model.into(),
            normal: normal_matrix(&model).into(),
        }
    }

    // Locations below 5 belong to the mesh vertex. A mat4 takes four vec4 slots,
    // the mat3 normal matrix three vec3 slots.
    const ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x3,
        10 => Float32x3,
        11 => Float32x3
    ];
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
