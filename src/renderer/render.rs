use std::collections::hash_map::Entry;

use egui_wgpu::ScreenDescriptor;

use super::gpu_mesh::{GpuMesh, MeshLayouts};
use super::renderer::Renderer;
use super::uniforms::FrameUniform;
use crate::stage::Stage;

impl Renderer {
    /// Uploads what changed in the stage, then draws the shadow map, the
    /// scene and the UI on top.
    pub fn render(
        &mut self,
        stage: &mut Stage,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        // Skip rendering if window size is invalid (minimized, not ready, etc.)
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(());
        }

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[FrameUniform::from_stage(stage)]),
        );

        let visible = stage.graph.visible_meshes(stage.root);
        let layouts = MeshLayouts {
            object: &self.object_layout,
            material: &self.material_layout,
        };
        for (id, model) in &visible {
            let Some(node) = stage.graph.get_mut(*id) else {
                continue;
            };
            let (cast, receive) = (node.cast_shadow, node.receive_shadow);
            let Some(mesh) = node.as_mesh_mut() else {
                continue;
            };
            let gpu = match self.meshes.entry(*id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(GpuMesh::new(
                    &self.device,
                    &self.queue,
                    &mut self.textures,
                    &layouts,
                    mesh,
                )),
            };
            gpu.sync(
                &self.device,
                &self.queue,
                &mut self.textures,
                &layouts,
                mesh,
                model,
                cast,
                receive,
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if stage.lights.directional.cast_shadow {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &self.shadow_pass_bind_group, &[]);
            for (id, _) in &visible {
                let Some(gpu) = self.meshes.get(id) else {
                    continue;
                };
                if !gpu.cast_shadow {
                    continue;
                }
                shadow_pass.set_bind_group(1, &gpu.object_bind_group, &[]);
                shadow_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                shadow_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for draw in gpu.draws.iter().filter(|d| d.count > 0) {
                    shadow_pass.draw_indexed(draw.start..draw.start + draw.count, 0, 0..1);
                }
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(backdrop) = &self.backdrop_bind_group {
                render_pass.set_pipeline(&self.backdrop_pipeline);
                render_pass.set_bind_group(0, backdrop, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (id, _) in &visible {
                let Some(gpu) = self.meshes.get(id) else {
                    continue;
                };
                render_pass.set_bind_group(1, &gpu.object_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for draw in gpu.draws.iter().filter(|d| d.count > 0) {
                    let Some(material) = gpu.material(draw) else {
                        continue;
                    };
                    render_pass.set_pipeline(if material.wireframe {
                        &self.wireframe_pipeline
                    } else {
                        &self.render_pipeline
                    });
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.draw_indexed(draw.start..draw.start + draw.count, 0, 0..1);
                }
            }
        }

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut egui_rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_rpass, &paint_jobs, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
