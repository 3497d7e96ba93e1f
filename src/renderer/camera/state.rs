use nalgebra_glm as glm;

/// Orbit pose in spherical coordinates around `target`, Y up.
/// `theta` is the azimuth around Y measured from +Z, `phi` the polar
/// angle measured from +Y.
#[derive(Debug, Clone)]
pub struct OrbitState {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub target: glm::Vec3,
}

impl OrbitState {
    pub fn new(theta: f32, phi: f32, radius: f32, target: glm::Vec3) -> Self {
        Self {
            theta,
            phi,
            radius,
            target,
        }
    }

    /// Pose that reproduces a camera sitting at `position` looking at `target`.
    pub fn looking_from(position: &glm::Vec3, target: &glm::Vec3) -> Self {
        let offset = position - target;
        let radius = glm::length(&offset);
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };
        Self::new(theta, phi, radius, *target)
    }

    pub fn eye(&self) -> glm::Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + glm::vec3(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }
}
