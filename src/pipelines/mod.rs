//! Render pipelines.
//!
//! - `basic` holds the lit colour pipeline, the material layout and the shared pipeline builder
//! - `light` holds the light uniform, the shadow map and their bind groups
//! - `shadow` holds the depth-only pipeline filling the shadow map

pub mod basic;
pub mod light;
pub mod shadow;

pub struct Pipelines {
    pub lit: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub material_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light: &light::LightResources,
    ) -> Self {
        let material_layout = basic::material_layout(device);
        let lit = basic::mk_lit_pipeline(
            device,
            config,
            &material_layout,
            camera_bind_group_layout,
            &light.bind_group_layout,
        );
        let shadow = shadow::mk_shadow_pipeline(device, &light.shadow_bind_group_layout);
        Self {
            lit,
            shadow,
            material_layout,
        }
    }
}
