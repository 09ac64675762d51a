//! Drawing the scene graph.
//!
//! [`SceneRenderer`] mirrors the scene graph on the GPU. Because the graph is
//! append-only, mirroring means uploading the objects added since the previous
//! sync; nothing uploaded is ever touched again. Every mesh becomes one
//! [`DrawCall`] with its own world matrix and material.
//!
//! A frame is two passes: casters are drawn into the light's shadow map, then
//! everything is drawn lit into the surface.

use std::{collections::HashMap, iter, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, Projection},
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        material::ImageData,
        scene_graph::{SceneGraph, VisualObject},
        texture::Texture,
    },
    pipelines::basic::MaterialUniform,
};

/// One mesh with everything needed to draw it.
pub struct DrawCall {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub num_indices: u32,
    pub instance: wgpu::Buffer,
    pub material: wgpu::BindGroup,
    pub cast_shadow: bool,
}

pub struct SceneRenderer {
    draws: Vec<DrawCall>,
    /// Number of scene objects already uploaded.
    synced: usize,
    white: Texture,
}

impl SceneRenderer {
    pub fn new(ctx: &Context) -> Self {
        Self {
            draws: Vec::new(),
            synced: 0,
            white: Texture::white(&ctx.device, &ctx.queue),
        }
    }

    /// Upload every object added to `scene` since the previous call.
    pub fn sync(&mut self, ctx: &Context, scene: &SceneGraph) {
        let start = self.synced;
        for (id, object) in scene.objects_from(start) {
            let before = self.draws.len();
            self.upload(ctx, object);
            log::debug!(
                "Uploaded {:?} ({}) as {} draw calls",
                id,
                object.name,
                self.draws.len() - before
            );
        }
        self.synced = scene.len();
    }

    fn upload(&mut self, ctx: &Context, object: &VisualObject) {
        let mut textures: HashMap<*const ImageData, Texture> = HashMap::new();
        let max_dimension = ctx.device.limits().max_texture_dimension_2d;

        for world in object.world_meshes() {
            let mesh = &world.mesh;
            if mesh.vertices.is_empty() || mesh.indices.is_empty() {
                continue;
            }
            let label = format!("{}/{}", object.name, mesh.name);

            let vertex = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Vertex Buffer")),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Index Buffer")),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            let instance = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Instance Buffer")),
                    contents: bytemuck::cast_slice(&[InstanceRaw::from_matrix(world.transform)]),
                    usage: wgpu::BufferUsages::VERTEX,
                });

            let uniform = MaterialUniform::new(&world.appearance, object.receive_shadow);
            let uniform_buffer = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Material Buffer")),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

            let texture: &Texture = match &world.appearance.texture {
                Some(image) => textures.entry(Arc::as_ptr(image)).or_insert_with(|| {
                    match image.fit_within(max_dimension) {
                        Ok(fitted) => {
                            if fitted.width != image.width || fitted.height != image.height {
                                log::info!(
                                    "Texture of {label} scaled from {}x{} to {}x{}",
                                    image.width,
                                    image.height,
                                    fitted.width,
                                    fitted.height
                                );
                            }
                            Texture::from_image_data(
                                &ctx.device,
                                &ctx.queue,
                                &fitted,
                                Some(label.as_str()),
                            )
                        }
                        Err(e) => {
                            log::warn!("Texture of {label} is unusable, using plain colour: {e:#}");
                            Texture::white(&ctx.device, &ctx.queue)
                        }
                    }
                }),
                None => &self.white,
            };
            let Some(sampler) = texture.sampler.as_ref() else {
                log::warn!("Texture of {label} has no sampler, skipping");
                continue;
            };

            let material = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &ctx.pipelines.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
                label: Some(&format!("{label} Material")),
            });

            self.draws.push(DrawCall {
                vertex,
                index,
                num_indices: mesh.indices.len() as u32,
                instance,
                material,
                cast_shadow: object.cast_shadow,
            });
        }
    }

    /// Draw one frame of `scene` as seen through `camera`.
    pub fn render(
        &mut self,
        ctx: &mut Context,
        scene: &SceneGraph,
        camera: &Camera,
        projection: &Projection,
    ) -> Result<(), wgpu::SurfaceError> {
        self.sync(ctx, scene);
        ctx.camera.write(&ctx.queue, camera, projection);
        ctx.light.write(&ctx.queue, scene);

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.light.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                ..Default::default()
            });
            if ctx.light.uniform.casts_shadow() {
                shadow_pass.set_pipeline(&ctx.pipelines.shadow);
                shadow_pass.set_bind_group(0, &ctx.light.shadow_bind_group, &[]);
                for draw in self.draws.iter().filter(|draw| draw.cast_shadow) {
                    shadow_pass.set_vertex_buffer(0, draw.vertex.slice(..));
                    shadow_pass.set_vertex_buffer(1, draw.instance.slice(..));
                    shadow_pass.set_index_buffer(draw.index.slice(..), wgpu::IndexFormat::Uint32);
                    shadow_pass.draw_indexed(0..draw.num_indices, 0, 0..1);
                }
            }
        }

        {
            let [r, g, b, a] = scene.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&ctx.pipelines.lit);
            render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(2, &ctx.light.bind_group, &[]);
            for draw in &self.draws {
                render_pass.set_bind_group(0, &draw.material, &[]);
                render_pass.set_vertex_buffer(0, draw.vertex.slice(..));
                render_pass.set_vertex_buffer(1, draw.instance.slice(..));
                render_pass.set_index_buffer(draw.index.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.num_indices, 0, 0..1);
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
