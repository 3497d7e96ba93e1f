use std::sync::Arc;

use crate::scene::Color;
use crate::texture::TextureImage;

/// Unlit surface: flat color, optional color map.
#[derive(Debug, Clone)]
pub struct BasicParams {
    pub color: Color,
    pub map: Option<Arc<TextureImage>>,
}

/// Metallic-roughness surface, the glTF default.
#[derive(Debug, Clone)]
pub struct StandardParams {
    pub color: Color,
    pub map: Option<Arc<TextureImage>>,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    pub emissive: Color,
    pub bump_map: Option<Arc<TextureImage>>,
    pub bump_scale: f32,
}

impl Default for StandardParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            roughness: 1.0,
            metalness: 0.0,
            env_map_intensity: 1.0,
            emissive: Color::BLACK,
            bump_map: None,
            bump_scale: 1.0,
        }
    }
}

/// Standard surface plus a clearcoat layer and a sheen lobe.
#[derive(Debug, Clone)]
pub struct PhysicalParams {
    pub standard: StandardParams,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub sheen: f32,
    pub sheen_color: Color,
}

impl From<StandardParams> for PhysicalParams {
    fn from(standard: StandardParams) -> Self {
        Self {
            standard,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            sheen: 0.0,
            sheen_color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MaterialKind {
    Basic(BasicParams),
    Standard(StandardParams),
    Physical(PhysicalParams),
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    pub kind: MaterialKind,
    pub wireframe: bool,
    pub double_sided: bool,
    pub opacity: f32,
    /// Set when texture bindings changed and the GPU copy must be rebuilt.
    /// The renderer clears it.
    pub needs_update: bool,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            name: None,
            kind,
            wireframe: false,
            double_sided: false,
            opacity: 1.0,
            needs_update: true,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self::new(MaterialKind::Basic(BasicParams { color, map: None }))
    }

    pub fn standard(params: StandardParams) -> Self {
        Self::new(MaterialKind::Standard(params))
    }

    pub fn color(&self) -> Color {
        match &self.kind {
            MaterialKind::Basic(p) => p.color,
            MaterialKind::Standard(p) => p.color,
            MaterialKind::Physical(p) => p.standard.color,
        }
    }

    pub fn color_mut(&mut self) -> &mut Color {
        match &mut self.kind {
            MaterialKind::Basic(p) => &mut p.color,
            MaterialKind::Standard(p) => &mut p.color,
            MaterialKind::Physical(p) => &mut p.standard.color,
        }
    }

    pub fn map(&self) -> Option<&Arc<TextureImage>> {
        match &self.kind {
            MaterialKind::Basic(p) => p.map.as_ref(),
            MaterialKind::Standard(p) => p.map.as_ref(),
            MaterialKind::Physical(p) => p.standard.map.as_ref(),
        }
    }

    pub fn bump_map(&self) -> Option<&Arc<TextureImage>> {
        match &self.kind {
            MaterialKind::Basic(_) => None,
            MaterialKind::Standard(p) => p.bump_map.as_ref(),
            MaterialKind::Physical(p) => p.standard.bump_map.as_ref(),
        }
    }

    /// Whether the surface takes the physical extras (clearcoat, sheen).
    /// Basic surfaces are unlit and never do.
    pub fn supports_physical(&self) -> bool {
        match self.kind {
            MaterialKind::Basic(_) => false,
            MaterialKind::Standard(_) | MaterialKind::Physical(_) => true,
        }
    }

    /// Promotes a standard surface to physical in place and returns its
    /// physical parameters. `None` for basic surfaces.
    pub fn physical_mut(&mut self) -> Option<&mut PhysicalParams> {
        if let MaterialKind::Standard(params) = &self.kind {
            self.kind = MaterialKind::Physical(params.clone().into());
        }
        match &mut self.kind {
            MaterialKind::Physical(params) => Some(params),
            MaterialKind::Basic(_) | MaterialKind::Standard(_) => None,
        }
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }
}

impl Default for Material {
    /// Surface used for primitives without a material: white, fully rough
    /// and fully metallic.
    fn default() -> Self {
        Self::standard(StandardParams {
            metalness: 1.0,
            ..Default::default()
        })
    }
}
