use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identity; the renderer keys its GPU copies by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// CPU-side texture: RGBA8 pixels plus the sampling parameters a material
/// needs to use it.
#[derive(Debug, Clone)]
pub struct TextureImage {
    id: TextureId,
    pub image: RgbaImage,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub repeat: [f32; 2],
    /// Color data (sRGB) as opposed to data maps such as bump or roughness.
    pub srgb: bool,
}

impl TextureImage {
    pub fn new(image: RgbaImage, srgb: bool) -> Self {
        Self {
            id: TextureId::next(),
            image,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            repeat: [1.0, 1.0],
            srgb,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
