use bytemuck::{Pod, Zeroable};

use super::{Material, MaterialKind};

/// Material uniform data that matches the WGSL `MaterialUniform` struct
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],              // linear rgb + opacity
    pub pbr: [f32; 4],                // roughness, metalness, env intensity, bump scale
    pub coat: [f32; 4],               // clearcoat, clearcoat roughness, sheen, unlit
    pub sheen_color: [f32; 4],        // linear rgb + unused
    pub emissive: [f32; 4],           // linear rgb + unused
    pub maps: [f32; 4],               // has color map, has bump map, bump repeat u, bump repeat v
}

impl MaterialUniform {
    pub fn from_material(material: &Material) -> Self {
        let [r, g, b] = material.color().to_linear();
        let has_map = flag(material.map().is_some());
        let (bump_flag, bump_repeat) = match material.bump_map() {
            Some(texture) => (1.0, texture.repeat),
            None => (0.0, [1.0, 1.0]),
        };

        let (pbr, coat, sheen_color, emissive) = match &material.kind {
            MaterialKind::Basic(_) => (
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
                [0.0; 4],
                [0.0; 4],
            ),
            MaterialKind::Standard(p) => {
                let [er, eg, eb] = p.emissive.to_linear();
                (
                    [p.roughness, p.metalness, p.env_map_intensity, p.bump_scale],
                    [0.0; 4],
                    [0.0; 4],
                    [er, eg, eb, 0.0],
                )
            }
            MaterialKind::Physical(p) => {
                let s = &p.standard;
                let [er, eg, eb] = s.emissive.to_linear();
                let [sr, sg, sb] = p.sheen_color.to_linear();
                (
                    [s.roughness, s.metalness, s.env_map_intensity, s.bump_scale],
                    [p.clearcoat, p.clearcoat_roughness, p.sheen, 0.0],
                    [sr, sg, sb, 0.0],
                    [er, eg, eb, 0.0],
                )
            }
        };

        Self {
            color: [r, g, b, material.opacity],
            pbr,
            coat,
            sheen_color,
            emissive,
            maps: [has_map, bump_flag, bump_repeat[0], bump_repeat[1]],
        }
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}
