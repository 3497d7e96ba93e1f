// Animation system module
// Clip sampling and the mixer that plays clips onto a scene graph

pub mod interpolation;
pub mod mixer;
pub mod types;

pub use mixer::{ActionId, AnimationAction, AnimationMixer};
pub use types::*;
