use std::collections::HashMap;

use log::debug;

use crate::texture::{TextureId, TextureImage, WrapMode};

/// GPU copy of one texture plus a sampler built from its wrap modes
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Uploads each `TextureImage` once and hands out its view and sampler.
/// The 1x1 white fallback stands in for absent maps.
pub struct TextureCache {
    textures: HashMap<TextureId, GpuTexture>,
    white: GpuTexture,
}

fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

#[allow(clippy::too_many_arguments)]
fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    rgba: &[u8],
    width: u32,
    height: u32,
    srgb: bool,
    wrap: (WrapMode, WrapMode),
) -> GpuTexture {
    let texture_size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: texture_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        },
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        texture_size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode(wrap.0),
        address_mode_v: address_mode(wrap.1),
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture { view, sampler }
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = upload(
            device,
            queue,
            "Default White Texture",
            &[255, 255, 255, 255],
            1,
            1,
            true,
            (WrapMode::Repeat, WrapMode::Repeat),
        );
        Self {
            textures: HashMap::new(),
            white,
        }
    }

    pub fn get_or_upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: Option<&TextureImage>,
    ) -> &GpuTexture {
        let Some(image) = image else {
            return &self.white;
        };
        self.textures.entry(image.id()).or_insert_with(|| {
            debug!(
                "Uploading texture {:?} ({}x{})",
                image.id(),
                image.width(),
                image.height()
            );
            upload(
                device,
                queue,
                "Loaded Texture",
                image.image.as_raw(),
                image.width(),
                image.height(),
                image.srgb,
                (image.wrap_s, image.wrap_t),
            )
        })
    }
}
