mod material;
mod uniform;

pub use material::*;
pub use uniform::*;
