//! CPU-side model data: vertices, meshes and the node hierarchy of a loaded model.
//!
//! Nothing in here touches the GPU. The renderer turns these into buffers once
//! an object is inserted into the scene graph, which keeps loading, placement
//! and bounds computation testable without a device.

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::{bounds::Aabb, instance, material::Appearance};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Triangle list geometry with an optional index into the owning model's materials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl MeshData {
    /// Replace all normals with area-weighted face normals.
    ///
    /// Used for glTF primitives that ship without a `NORMAL` attribute.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];
        for c in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
            if i0 >= self.vertices.len() || i1 >= self.vertices.len() || i2 >= self.vertices.len() {
                continue;
            }
            let p0: cgmath::Vector3<f32> = self.vertices[i0].position.into();
            let p1: cgmath::Vector3<f32> = self.vertices[i1].position.into();
            let p2: cgmath::Vector3<f32> = self.vertices[i2].position.into();
            // not normalised: the cross product length weights by triangle area
            let face = (p1 - p0).cross(p2 - p0);
            normals[i0] += face;
            normals[i1] += face;
            normals[i2] += face;
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = if cgmath::InnerSpace::magnitude2(normal) > 0.0 {
                cgmath::InnerSpace::normalize(normal).into()
            } else {
                [0.0, 1.0, 0.0]
            };
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = cgmath::Vector3<f32>> + '_ {
        self.vertices.iter().map(|v| v.position.into())
    }
}

/// One node of a loaded model: a local transform, its meshes and child nodes.
#[derive(Clone, Debug)]
pub struct ModelNode {
    pub name: Option<String>,
    /// Transform relative to the parent node.
    pub local: Matrix4<f32>,
    pub meshes: Vec<Arc<MeshData>>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    /// Depth-first walk handing every mesh to `f` together with its model-space transform.
    pub fn visit_meshes(
        &self,
        parent: &Matrix4<f32>,
        f: &mut dyn FnMut(&Matrix4<f32>, &Arc<MeshData>),
    ) {
        let world = *parent * self.local;
        for mesh in &self.meshes {
            f(&world, mesh);
        }
        for child in &self.children {
            child.visit_meshes(&world, f);
        }
    }
}

/// A parsed external model: its node hierarchy and the materials its meshes refer to.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    /// Path the model was loaded from, used for labels and diagnostics.
    pub source: String,
    pub materials: Vec<Appearance>,
    pub roots: Vec<ModelNode>,
}

impl ModelData {
    pub fn for_each_mesh(&self, f: &mut dyn FnMut(&Matrix4<f32>, &Arc<MeshData>)) {
        let identity = Matrix4::identity();
        for root in &self.roots {
            root.visit_meshes(&identity, f);
        }
    }

    /// Bounding box of every vertex after applying the node hierarchy.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        self.for_each_mesh(&mut |transform, mesh| {
            mesh.positions()
                .for_each(|p| aabb.expand(instance::transform_point(transform, p)));
        });
        aabb
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(&mut |_, _| count += 1);
        count
    }

    /// Material for a mesh, falling back to the glTF default material.
    pub fn material(&self, mesh: &MeshData) -> Appearance {
        mesh.material
            .and_then(|idx| self.materials.get(idx))
            .cloned()
            .unwrap_or_default()
    }
}
