use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub window_width: f64,
    pub window_height: f64,
    pub transparent_background: bool,
    pub tone_mapping_exposure: f32,
    /// Paint the procedural gradient behind the model instead of leaving
    /// the background transparent.
    pub show_gradient_backdrop: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_width: 1200.0,
            window_height: 800.0,
            transparent_background: true,
            tone_mapping_exposure: 1.1,
            show_gradient_backdrop: false,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }
}

/// Which controls the side panel carries. A control that is switched off
/// is neither drawn nor bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSettings {
    pub color: bool,
    pub size: bool,
    pub animate: bool,
    pub auto_rotate: bool,
    pub wireframe: bool,
    pub morph_panel: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            color: true,
            size: true,
            animate: true,
            auto_rotate: true,
            wireframe: true,
            morph_panel: true,
        }
    }
}

impl ControlSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "controls").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub show_panel: bool,
    pub show_shape_keys: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_panel: true,
            show_shape_keys: true,
        }
    }
}

impl UiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "ui").unwrap_or_default()
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub controls: ControlSettings,
    pub ui: UiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            controls: ControlSettings::load(),
            ui: UiSettings::load(),
        }
    }
}
