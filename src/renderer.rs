//! wgpu side of the viewer: pipelines, GPU copies of scene meshes and the
//! per-frame draw, with the egui pass composited last.

pub mod camera;
mod gpu_mesh;
mod render;
#[allow(clippy::module_inception)]
mod renderer;
mod texture_cache;
mod uniforms;
mod vertex;

pub use renderer::Renderer;
pub use uniforms::{FrameUniform, ObjectUniform};
pub use vertex::Vertex;
