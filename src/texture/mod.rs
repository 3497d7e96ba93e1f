pub mod image;
pub mod procedural;

pub use self::image::{TextureId, TextureImage, WrapMode};
pub use procedural::{generate_gradient_texture, generate_noise_texture};
