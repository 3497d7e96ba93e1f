use nalgebra_glm as glm;
use wgpu::util::DeviceExt;

use super::texture_cache::TextureCache;
use super::uniforms::ObjectUniform;
use super::vertex::Vertex;
use crate::material::{Material, MaterialUniform};
use crate::scene::Mesh;

/// Index range drawn with one material slot
#[derive(Debug, Clone, Copy)]
pub struct DrawRange {
    pub start: u32,
    pub count: u32,
    pub material: usize,
}

pub struct GpuMaterial {
    buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) wireframe: bool,
}

/// GPU side of one scene mesh. Vertex data is re-uploaded only when the
/// morph influences moved; uniforms are rewritten every frame.
pub struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) draws: Vec<DrawRange>,
    object_buffer: wgpu::Buffer,
    pub(crate) object_bind_group: wgpu::BindGroup,
    pub(crate) materials: Vec<GpuMaterial>,
    pub(crate) cast_shadow: bool,
    influences: Vec<f32>,
}

pub struct MeshLayouts<'a> {
    pub object: &'a wgpu::BindGroupLayout,
    pub material: &'a wgpu::BindGroupLayout,
}

fn draw_ranges(mesh: &Mesh) -> Vec<DrawRange> {
    let geometry = &mesh.geometry;
    if geometry.groups.is_empty() {
        return vec![DrawRange {
            start: 0,
            count: geometry.indices.len() as u32,
            material: 0,
        }];
    }
    geometry
        .groups
        .iter()
        .map(|g| DrawRange {
            start: g.start,
            count: g.count,
            material: g.material_index,
        })
        .collect()
}

fn material_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    cache: &mut TextureCache,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    material: &Material,
) -> wgpu::BindGroup {
    let color = cache.get_or_upload(device, queue, material.map().map(|t| t.as_ref()));
    let (color_view, color_sampler) = (color.view.clone(), color.sampler.clone());
    let bump = cache.get_or_upload(device, queue, material.bump_map().map(|t| t.as_ref()));

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Material Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&color_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&color_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&bump.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&bump.sampler),
            },
        ],
    })
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &mut TextureCache,
        layouts: &MeshLayouts,
        mesh: &mut Mesh,
    ) -> Self {
        let (positions, normals) = mesh.current_vertices();
        let vertices = Vertex::interleave(&positions, &normals, &mesh.geometry.uvs);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Buffer"),
            contents: bytemuck::cast_slice(&[ObjectUniform::new(&glm::identity(), false)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });

        let mut gpu = Self {
            vertex_buffer,
            index_buffer,
            draws: draw_ranges(mesh),
            object_buffer,
            object_bind_group,
            materials: Vec::new(),
            cast_shadow: false,
            influences: mesh
                .morph
                .as_ref()
                .map(|m| m.influences().to_vec())
                .unwrap_or_default(),
        };
        gpu.rebuild_materials(device, queue, cache, layouts.material, mesh);
        gpu
    }

    fn rebuild_materials(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &mut TextureCache,
        layout: &wgpu::BindGroupLayout,
        mesh: &mut Mesh,
    ) {
        self.materials = mesh
            .materials_mut()
            .map(|material| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Material Buffer"),
                    contents: bytemuck::cast_slice(&[MaterialUniform::from_material(material)]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group =
                    material_bind_group(device, queue, cache, layout, &buffer, material);
                material.needs_update = false;
                GpuMaterial {
                    buffer,
                    bind_group,
                    wireframe: material.wireframe,
                }
            })
            .collect();
    }

    /// Brings the GPU copy in line with the scene mesh for this frame.
    #[allow(clippy::too_many_arguments)]
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &mut TextureCache,
        layouts: &MeshLayouts,
        mesh: &mut Mesh,
        model: &glm::Mat4,
        cast_shadow: bool,
        receive_shadow: bool,
    ) {
        let stale = mesh.material.len() != self.materials.len()
            || mesh.materials().any(|m| m.needs_update);
        if stale {
            self.rebuild_materials(device, queue, cache, layouts.material, mesh);
        } else {
            for (gpu, material) in self.materials.iter_mut().zip(mesh.materials()) {
                gpu.wireframe = material.wireframe;
                queue.write_buffer(
                    &gpu.buffer,
                    0,
                    bytemuck::cast_slice(&[MaterialUniform::from_material(material)]),
                );
            }
        }

        if let Some(morph) = &mesh.morph {
            if morph.influences() != self.influences.as_slice() {
                let (positions, normals) = mesh.current_vertices();
                let vertices = Vertex::interleave(&positions, &normals, &mesh.geometry.uvs);
                queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
                self.influences = morph.influences().to_vec();
            }
        }

        self.cast_shadow = cast_shadow;
        queue.write_buffer(
            &self.object_buffer,
            0,
            bytemuck::cast_slice(&[ObjectUniform::new(model, receive_shadow)]),
        );
    }

    /// Material slot for a draw; out-of-range slots fall back to the first.
    pub fn material(&self, draw: &DrawRange) -> Option<&GpuMaterial> {
        self.materials
            .get(draw.material)
            .or_else(|| self.materials.first())
    }
}
