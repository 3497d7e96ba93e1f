use nalgebra_glm as glm;

/// Perspective camera, Y up. The orbit controller owns where it sits;
/// this only holds the lens and the resulting pose.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: glm::Vec3,
    pub target: glm::Vec3,
    pub up: glm::Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: glm::vec3(0.0, 0.0, 0.0),
            target: glm::vec3(0.0, 0.0, 0.0),
            up: glm::vec3(0.0, 1.0, 0.0),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Projection into wgpu's 0..1 depth range
    pub fn projection_matrix(&self) -> glm::Mat4 {
        glm::perspective_rh_zo(self.aspect, self.fov_y_degrees.to_radians(), self.near, self.far)
    }

    pub fn view_projection(&self) -> glm::Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
