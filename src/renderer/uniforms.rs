use bytemuck::{Pod, Zeroable};
use nalgebra_glm as glm;

use crate::scene::Color;
use crate::stage::{Stage, ToneMapping};

/// Per-frame data matching the WGSL `Frame` struct
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub hemi_up: [f32; 4],
    pub dir_color: [f32; 4],
    pub dir_to_light: [f32; 4],
    pub spot_color: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_cone: [f32; 4],
    pub params: [f32; 4], // exposure, tone mapping on, shadow bias, shadow texel size
}

fn radiance(color: Color, intensity: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, 0.0]
}

fn vec4(v: &glm::Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

pub fn mat4(m: &glm::Mat4) -> [[f32; 4]; 4] {
    (*m).into()
}

impl FrameUniform {
    pub fn from_stage(stage: &Stage) -> Self {
        let lights = &stage.lights;
        let hemi = &lights.hemisphere;
        let dir = &lights.directional;
        let spot = &lights.spot;

        let (exposure, tone) = match stage.tone_mapping {
            ToneMapping::None => (1.0, 0.0),
            ToneMapping::AcesFilmic { exposure } => (exposure, 1.0),
        };

        Self {
            view_proj: mat4(&stage.camera.view_projection()),
            light_view_proj: mat4(&dir.shadow_view_projection()),
            camera_pos: vec4(&stage.camera.position, 1.0),
            ambient: radiance(lights.ambient.color, lights.ambient.intensity),
            hemi_sky: radiance(hemi.sky_color, hemi.intensity),
            hemi_ground: radiance(hemi.ground_color, hemi.intensity),
            hemi_up: vec4(&glm::normalize(&hemi.position), 0.0),
            dir_color: radiance(dir.color, dir.intensity),
            dir_to_light: vec4(&dir.direction(), 0.0),
            spot_color: radiance(spot.color, spot.intensity),
            spot_position: vec4(&spot.position, spot.distance),
            spot_direction: vec4(&spot.direction(), spot.decay),
            spot_cone: [spot.cos_outer(), spot.cos_inner(), 0.0, 0.0],
            params: [
                exposure,
                tone,
                dir.shadow.bias,
                1.0 / dir.shadow.map_size.max(1) as f32,
            ],
        }
    }
}

/// Per-mesh transform matching the WGSL `Object` struct
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub flags: [f32; 4], // receive shadow
}

impl ObjectUniform {
    pub fn new(model: &glm::Mat4, receive_shadow: bool) -> Self {
        let normal = glm::transpose(&glm::inverse(model));
        Self {
            model: mat4(model),
            normal: mat4(&normal),
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DisplaySettings;
    use crate::stage::Viewport;

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(size_of::<FrameUniform>() % 16, 0);
        assert_eq!(size_of::<ObjectUniform>(), 144);
    }

    #[test]
    fn frame_carries_exposure_and_shadow_params() {
        let stage = Stage::bootstrap(
            Viewport {
                width: 800,
                height: 600,
            },
            &DisplaySettings::default(),
        )
        .unwrap();
        let frame = FrameUniform::from_stage(&stage);
        assert_eq!(frame.params[0], 1.1);
        assert_eq!(frame.params[1], 1.0);
        assert_eq!(frame.params[2], -0.0001);
        assert_eq!(frame.params[3], 1.0 / 2048.0);
        assert_eq!(frame.camera_pos, [0.0, 0.0, 4.0, 1.0]);
        assert!((frame.ambient[0] - 0.15).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let model = glm::scaling(&glm::vec3(2.0, 1.0, 1.0));
        let object = ObjectUniform::new(&model, true);
        assert!((object.normal[0][0] - 0.5).abs() < 1e-6);
        assert_eq!(object.flags[0], 1.0);
    }
}
