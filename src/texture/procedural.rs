//! Textures generated at runtime instead of loaded from the asset.

use image::{Rgba, RgbaImage};
use rand::Rng;

use super::image::{TextureImage, WrapMode};

pub const NOISE_SIZE: u32 = 128;
pub const NOISE_REPEAT: [f32; 2] = [4.0, 4.0];
pub const GRADIENT_SIZE: u32 = 256;
pub const GRADIENT_TOP: [u8; 3] = [0x23, 0x24, 0x3a];
pub const GRADIENT_BOTTOM: [u8; 3] = [0x7e, 0xcf, 0xff];

/// Gray noise used as a bump map: each pixel is an independent uniform
/// value in `[128, 255]` with full alpha. Repeats 4x4 over the surface.
pub fn generate_noise_texture() -> TextureImage {
    generate_noise_texture_with(&mut rand::rng())
}

pub fn generate_noise_texture_with<R: Rng + ?Sized>(rng: &mut R) -> TextureImage {
    let mut image = RgbaImage::new(NOISE_SIZE, NOISE_SIZE);
    for pixel in image.pixels_mut() {
        let value: u8 = rng.random_range(128..=255);
        *pixel = Rgba([value, value, value, 255]);
    }

    let mut texture = TextureImage::new(image, false);
    texture.wrap_s = WrapMode::Repeat;
    texture.wrap_t = WrapMode::Repeat;
    texture.repeat = NOISE_REPEAT;
    texture
}

/// Vertical linear gradient, top row `GRADIENT_TOP`, bottom row
/// `GRADIENT_BOTTOM`. Used only as the optional backdrop.
pub fn generate_gradient_texture() -> TextureImage {
    let mut image = RgbaImage::new(GRADIENT_SIZE, GRADIENT_SIZE);
    let last_row = (GRADIENT_SIZE - 1) as f32;
    for (_, y, pixel) in image.enumerate_pixels_mut() {
        let t = y as f32 / last_row;
        let channel = |i: usize| {
            let a = GRADIENT_TOP[i] as f32;
            let b = GRADIENT_BOTTOM[i] as f32;
            (a + (b - a) * t).round() as u8
        };
        *pixel = Rgba([channel(0), channel(1), channel(2), 255]);
    }

    let mut texture = TextureImage::new(image, true);
    texture.wrap_s = WrapMode::ClampToEdge;
    texture.wrap_t = WrapMode::ClampToEdge;
    texture
}
