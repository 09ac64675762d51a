use cgmath::SquareMatrix;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    light::{Light, ShadowCamera},
    scene_graph::SceneGraph,
    texture::{self, Texture},
};

/// Shadow map size used when the scene has no shadow-casting light.
const FALLBACK_SHADOW_MAP_SIZE: u32 = 1;

/// Lighting data shared by the shadow and the main pass.
///
/// Only the first directional light of a scene is represented; without one the
/// direct term is black and the shadow factor is one.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    view_proj: [[f32; 4]; 4],
    // w is 1 when the light casts shadows
    direction: [f32; 4],
    colour: [f32; 4],
    ambient: [f32; 4],
}

impl LightUniform {
    pub fn from_scene(scene: &SceneGraph) -> Self {
        let ambient = scene.ambient();
        let mut uniform = Self {
            view_proj: cgmath::Matrix4::<f32>::identity().into(),
            direction: [0.0, 1.0, 0.0, 0.0],
            colour: [0.0; 4],
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
        };
        if let Some(sun) = scene.sun() {
            if let Some(dir) = sun.direction_to_light() {
                let radiance = sun.radiance();
                uniform.colour = [radiance[0], radiance[1], radiance[2], 1.0];
                let casts = match sun.shadow_view_proj() {
                    Some(view_proj) => {
                        uniform.view_proj = view_proj.into();
                        1.0
                    }
                    None => 0.0,
                };
                uniform.direction = [dir.x, dir.y, dir.z, casts];
            }
        }
        uniform
    }

    pub fn casts_shadow(&self) -> bool {
        self.direction[3] > 0.5
    }
}

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub shadow_map: Texture,
    pub shadow_sampler: wgpu::Sampler,
    /// Uniform, shadow map and comparison sampler for the main pass.
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// Only the uniform, for rendering into the shadow map.
    pub shadow_bind_group: wgpu::BindGroup,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, scene: &SceneGraph) -> Self {
        let uniform = LightUniform::from_scene(scene);
        let map_size = scene
            .sun()
            .and_then(Light::shadow)
            .map(|shadow: &ShadowCamera| shadow.map_size)
            .unwrap_or(FALLBACK_SHADOW_MAP_SIZE);

        let buffer = mk_buffer(device, uniform);
        let shadow_map = Texture::create_shadow_map(device, map_size);
        let shadow_sampler = texture::create_shadow_sampler(device);
        let bind_group_layout = mk_bind_group_layout(device);
        let shadow_bind_group_layout = mk_shadow_bind_group_layout(device);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
            label: Some("light_bind_group"),
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });

        log::debug!("Shadow map is {map_size}x{map_size}");

        Self {
            uniform,
            buffer,
            shadow_map,
            shadow_sampler,
            bind_group,
            bind_group_layout,
            shadow_bind_group,
            shadow_bind_group_layout,
        }
    }

    /// Refresh the uniform from the scene's lights.
    pub fn write(&mut self, queue: &wgpu::Queue, scene: &SceneGraph) {
        self.uniform = LightUniform::from_scene(scene);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_shadow_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0)],
        label: Some("shadow_bind_group_layout"),
    })
}
