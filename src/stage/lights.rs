use nalgebra_glm as glm;

use crate::scene::Color;

#[derive(Debug, Clone)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Sky color from above, ground color from below, blended by normal.y.
#[derive(Debug, Clone)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
    pub position: glm::Vec3,
}

#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub bias: f32,
    pub map_size: u32,
    /// Half extent of the orthographic shadow frustum
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.0,
            map_size: 512,
            half_extent: 5.0,
            near: 0.5,
            far: 500.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: glm::Vec3,
    pub target: glm::Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl DirectionalLight {
    /// Unit vector from the target toward the light
    pub fn direction(&self) -> glm::Vec3 {
        glm::normalize(&(self.position - self.target))
    }

    pub fn shadow_view_projection(&self) -> glm::Mat4 {
        let e = self.shadow.half_extent;
        let proj = glm::ortho_rh_zo(-e, e, -e, e, self.shadow.near, self.shadow.far);
        let view = glm::look_at_rh(&self.position, &self.target, &glm::vec3(0.0, 1.0, 0.0));
        proj * view
    }
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    /// 0 means unlimited range
    pub distance: f32,
    /// Half-angle of the cone, radians
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: glm::Vec3,
    pub target: glm::Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl SpotLight {
    /// Unit vector the cone points along
    pub fn direction(&self) -> glm::Vec3 {
        glm::normalize(&(self.target - self.position))
    }

    pub fn cos_outer(&self) -> f32 {
        self.angle.cos()
    }

    pub fn cos_inner(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra)).cos()
    }
}

/// Fixed four-light studio rig
#[derive(Debug, Clone)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub spot: SpotLight,
}

impl LightRig {
    pub fn studio() -> Self {
        let origin = glm::vec3(0.0, 0.0, 0.0);
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.15,
            },
            hemisphere: HemisphereLight {
                sky_color: Color::WHITE,
                ground_color: Color::from_hex(0x222233),
                intensity: 0.3,
                position: glm::vec3(0.0, 1.0, 0.0),
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: 0.5,
                position: glm::vec3(3.0, 10.0, 10.0),
                target: origin,
                cast_shadow: true,
                shadow: ShadowConfig {
                    bias: -0.0001,
                    map_size: 2048,
                    ..Default::default()
                },
            },
            spot: SpotLight {
                color: Color::from_hex(0xfff0e0),
                intensity: 0.25,
                distance: 0.0,
                angle: std::f32::consts::PI / 6.0,
                penumbra: 0.2,
                decay: 1.5,
                position: glm::vec3(-8.0, 12.0, 8.0),
                target: origin,
                cast_shadow: true,
                shadow: ShadowConfig::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_rig_matches_fixed_setup() {
        let rig = LightRig::studio();
        assert_eq!(rig.ambient.intensity, 0.15);
        assert_eq!(rig.hemisphere.intensity, 0.3);
        assert!(rig.directional.cast_shadow);
        assert_eq!(rig.directional.shadow.map_size, 2048);
        assert_eq!(rig.directional.shadow.bias, -0.0001);
        assert!(rig.spot.cast_shadow);
        assert!(rig.spot.cos_inner() > rig.spot.cos_outer());
    }

    #[test]
    fn directional_direction_points_at_light() {
        let rig = LightRig::studio();
        let dir = rig.directional.direction();
        assert!(dir.y > 0.0 && dir.z > 0.0);
        assert!((glm::length(&dir) - 1.0).abs() < 1e-6);
    }
}
