mod binder;
mod morph;

pub use binder::*;
pub use morph::{MORPH_MAX, MORPH_MIN, MORPH_STEP, MorphPanel, MorphSlider};
