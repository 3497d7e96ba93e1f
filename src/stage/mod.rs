//! The fixed stage everything is drawn on: an empty scene root, the camera
//! and the light rig, built once before any asset is available.

mod camera;
mod lights;

pub use camera::PerspectiveCamera;
pub use lights::*;

use std::sync::Arc;

use log::info;
use nalgebra_glm as glm;

use crate::error::ViewerError;
use crate::scene::{Node, NodeId, NodeOffset, SceneGraph};
use crate::settings::DisplaySettings;
use crate::texture::{TextureImage, generate_gradient_texture};

pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START_DISTANCE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub enum Background {
    Transparent,
    Gradient(Arc<TextureImage>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneMapping {
    None,
    AcesFilmic { exposure: f32 },
}

pub struct Stage {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub camera: PerspectiveCamera,
    pub lights: LightRig,
    pub background: Background,
    pub tone_mapping: ToneMapping,
    viewport: Viewport,
}

impl Stage {
    /// Builds the stage for a viewport of the given pixel size. A viewport
    /// with no area cannot size the camera and is rejected.
    pub fn bootstrap(viewport: Viewport, display: &DisplaySettings) -> Result<Self, ViewerError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(ViewerError::new("viewport-empty")
                .with_arg("width", viewport.width)
                .with_arg("height", viewport.height));
        }

        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("Stage"));

        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR);
        camera.set_aspect(viewport.width, viewport.height);
        camera.position = glm::vec3(0.0, 0.0, CAMERA_START_DISTANCE);

        let background = if display.show_gradient_backdrop {
            Background::Gradient(Arc::new(generate_gradient_texture()))
        } else {
            Background::Transparent
        };

        info!(
            "Stage ready: {}x{} viewport, background {:?}",
            viewport.width,
            viewport.height,
            match background {
                Background::Transparent => "transparent",
                Background::Gradient(_) => "gradient",
            }
        );

        Ok(Self {
            graph,
            root,
            camera,
            lights: LightRig::studio(),
            background,
            tone_mapping: ToneMapping::AcesFilmic {
                exposure: display.tone_mapping_exposure,
            },
            viewport,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Follows a viewport resize. Zero-sized (minimized) viewports are
    /// ignored so the aspect ratio stays finite.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport { width, height };
        self.camera.set_aspect(width, height);
    }

    /// Hangs a loaded asset graph under the stage root.
    pub fn add_asset(&mut self, graph: SceneGraph, asset_root: NodeId) -> NodeOffset {
        self.graph.graft(self.root, graph, asset_root)
    }
}
