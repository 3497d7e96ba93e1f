use std::f32::consts::PI;

use nalgebra_glm as glm;

use super::OrbitState;
use crate::stage::PerspectiveCamera;

const MIN_POLAR: f32 = 1e-6;
const MAX_POLAR: f32 = PI - 1e-6;
const ZOOM_STEP: f32 = 0.95;

/// Turns pointer input into orbit motion around a target and drives the
/// camera pose. Input is accumulated and applied on `update`.
pub struct OrbitController {
    state: OrbitState,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    left_mouse_pressed: bool,
    middle_mouse_pressed: bool,
    right_mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    delta_theta: f32,
    delta_phi: f32,
    zoom_scale: f32,
    pan: [f32; 2], // viewport-height units
}

impl OrbitController {
    pub fn new(state: OrbitState) -> Self {
        Self {
            state,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            left_mouse_pressed: false,
            middle_mouse_pressed: false,
            right_mouse_pressed: false,
            last_mouse_pos: None,
            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom_scale: 1.0,
            pan: [0.0, 0.0],
        }
    }

    /// Controller that starts where `camera` currently is.
    pub fn for_camera(camera: &PerspectiveCamera) -> Self {
        Self::new(OrbitState::looking_from(&camera.position, &camera.target))
    }

    pub fn state(&self) -> &OrbitState {
        &self.state
    }

    /// Azimuth step per update. At speed 2.0 a full turn takes 1800
    /// updates, 30 seconds at 60 updates per second.
    pub fn auto_rotation_angle(&self) -> f32 {
        2.0 * PI / 60.0 / 60.0 * self.auto_rotate_speed
    }

    pub fn set_auto_rotate(&mut self, enabled: bool, speed: f32) {
        self.auto_rotate = enabled;
        self.auto_rotate_speed = speed;
    }

    /// Handle mouse button press/release
    pub fn on_mouse_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        match button {
            winit::event::MouseButton::Left => self.left_mouse_pressed = pressed,
            winit::event::MouseButton::Middle => self.middle_mouse_pressed = pressed,
            winit::event::MouseButton::Right => self.right_mouse_pressed = pressed,
            _ => return,
        }
        if !pressed {
            self.last_mouse_pos = None;
        }
    }

    /// Left drag orbits, right or middle drag pans. Returns whether the
    /// move was consumed.
    pub fn on_mouse_move(&mut self, position: (f64, f64), viewport_height: u32) -> bool {
        let rotating = self.left_mouse_pressed;
        let panning = self.right_mouse_pressed || self.middle_mouse_pressed;
        if !rotating && !panning {
            self.last_mouse_pos = None;
            return false;
        }

        let mut handled = false;
        if let Some(last) = self.last_mouse_pos {
            let height = viewport_height.max(1) as f32;
            let dx = (position.0 - last.0) as f32 / height;
            let dy = (position.1 - last.1) as f32 / height;
            if rotating {
                self.rotate(dx, dy);
            } else {
                self.pan[0] += dx;
                self.pan[1] += dy;
            }
            handled = true;
        }
        self.last_mouse_pos = Some(position);
        handled
    }

    /// Positive `lines` (wheel away from the user) moves closer.
    pub fn on_scroll(&mut self, lines: f32) {
        self.zoom_scale *= ZOOM_STEP.powf(lines);
    }

    /// Drag deltas are in viewport-height units; a full-height drag turns
    /// a full circle.
    fn rotate(&mut self, dx: f32, dy: f32) {
        self.delta_theta -= 2.0 * PI * dx * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy * self.rotate_speed;
    }

    /// Applies pending input and auto-rotation, then writes the pose into
    /// `camera`. Returns whether the pose changed.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if self.auto_rotate {
            self.delta_theta -= self.auto_rotation_angle();
        }

        let before = (self.state.theta, self.state.phi, self.state.radius, self.state.target);

        self.state.theta += self.delta_theta;
        self.state.phi = (self.state.phi + self.delta_phi).clamp(MIN_POLAR, MAX_POLAR);
        self.state.radius =
            (self.state.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        if self.pan != [0.0, 0.0] {
            let eye = self.state.eye();
            let forward = glm::normalize(&(self.state.target - eye));
            let right = glm::normalize(&glm::cross(&forward, &glm::vec3(0.0, 1.0, 0.0)));
            let up = glm::cross(&right, &forward);
            let span = 2.0 * self.state.radius * (camera.fov_y_degrees.to_radians() / 2.0).tan();
            self.state.target += -right * self.pan[0] * span + up * self.pan[1] * span;
        }

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.zoom_scale = 1.0;
        self.pan = [0.0, 0.0];

        camera.position = self.state.eye();
        camera.target = self.state.target;

        before != (self.state.theta, self.state.phi, self.state.radius, self.state.target)
    }
}
