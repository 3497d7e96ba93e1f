mod color;
mod graph;
mod mesh;

pub use color::*;
pub use graph::*;
pub use mesh::*;
