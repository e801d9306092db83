use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::scene::OrbitControlsConfig;

const EPSILON: f32 = 1e-6;
const MIN_DISTANCE: f32 = 1e-3;

/// Spherical coordinates around the orbit target; `theta` is the azimuth
/// around +Y measured from +Z, `phi` the polar angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= EPSILON {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit camera driven by pointer gestures, with inertial damping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitControlsConfig,
    target: Vec3,
    eye: Vec3,
    damping_factor: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub const DEFAULT_DAMPING: f32 = 0.05;

    pub fn new(config: OrbitControlsConfig, eye: Vec3, target: Vec3) -> Self {
        Self {
            config,
            target,
            eye,
            damping_factor: Self::DEFAULT_DAMPING,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// `0.0` disables damping; deltas then apply fully on the next update.
    pub fn with_damping(mut self, factor: f32) -> Self {
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn config(&self) -> &OrbitControlsConfig {
        &self.config
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Drag in physical pixels; a drag across the full viewport height
    /// turns the camera by `TAU * rotate_speed`.
    pub fn rotate(&mut self, delta_px: Vec2, viewport_height: f32) {
        if !self.config.enable_rotate || viewport_height <= 0.0 {
            return;
        }
        let delta = delta_px * self.config.rotate_speed;
        self.delta_theta -= TAU * delta.x / viewport_height;
        self.delta_phi -= TAU * delta.y / viewport_height;
    }

    /// Screen-space pan so the target follows the pointer at the target's
    /// depth. `fov` is the vertical field of view in degrees.
    pub fn pan(&mut self, delta_px: Vec2, viewport_height: f32, fov: f32) {
        if !self.config.enable_pan || viewport_height <= 0.0 {
            return;
        }
        let delta = delta_px * self.config.pan_speed;
        let target_distance = self.distance() * (fov.to_radians() * 0.5).tan();
        let view = self.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        self.pan_offset += right * (-2.0 * delta.x * target_distance / viewport_height);
        self.pan_offset += up * (2.0 * delta.y * target_distance / viewport_height);
    }

    /// Positive steps move towards the target.
    pub fn dolly(&mut self, steps: f32) {
        if !self.config.enable_zoom || steps == 0.0 {
            return;
        }
        let factor = 0.95f32.powf(self.config.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.scale *= factor;
        } else {
            self.scale /= factor;
        }
    }

    /// Applies pending gestures to the camera. Returns whether the eye moved.
    pub fn update(&mut self) -> bool {
        let previous_eye = self.eye;
        let mut spherical = Spherical::from_offset(self.eye - self.target);

        if self.damping_factor > 0.0 {
            spherical.theta += self.delta_theta * self.damping_factor;
            spherical.phi += self.delta_phi * self.damping_factor;
            self.target += self.pan_offset * self.damping_factor;
        } else {
            spherical.theta += self.delta_theta;
            spherical.phi += self.delta_phi;
            self.target += self.pan_offset;
        }
        spherical.phi = spherical.phi.clamp(EPSILON, PI - EPSILON);
        spherical.radius = (spherical.radius * self.scale).max(MIN_DISTANCE);

        self.eye = self.target + spherical.to_offset();

        if self.damping_factor > 0.0 {
            let keep = 1.0 - self.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        self.eye.distance_squared(previous_eye) > EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn controls() -> OrbitControls {
        let scene = Scene::compose();
        OrbitControls::new(
            *scene.controls().unwrap(),
            scene.viewport().position,
            Vec3::ZERO,
        )
        .with_damping(0.0)
    }

    #[test]
    fn config_is_passed_through_unmodified() {
        let scene = Scene::compose();
        let controls = OrbitControls::new(*scene.controls().unwrap(), Vec3::Z * 4.0, Vec3::ZERO);
        assert_eq!(controls.config(), scene.controls().unwrap());
        assert_eq!(controls.config().zoom_speed, 0.6);
        assert_eq!(controls.config().pan_speed, 0.5);
        assert_eq!(controls.config().rotate_speed, 0.4);
    }

    #[test]
    fn idle_update_keeps_camera() {
        let mut controls = controls();
        assert!(!controls.update());
        assert!((controls.eye() - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn horizontal_drag_orbits_at_constant_distance() {
        let mut controls = controls();
        controls.rotate(Vec2::new(100.0, 0.0), 600.0);
        assert!(controls.update());
        assert!((controls.distance() - 4.0).abs() < 1e-4);
        assert!(controls.eye().x < 0.0);
        assert!(controls.eye().y.abs() < 1e-4);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut controls = controls();
        controls.rotate(Vec2::new(0.0, 100_000.0), 600.0);
        controls.update();
        let eye = controls.eye();
        assert!(eye.y > 0.0 && eye.y <= 4.0);
        assert!((controls.distance() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn dolly_moves_towards_target() {
        let mut controls = controls();
        controls.dolly(1.0);
        controls.update();
        let expected = 4.0 * 0.95f32.powf(0.6);
        assert!((controls.distance() - expected).abs() < 1e-4);

        controls.dolly(-1.0);
        controls.update();
        assert!((controls.distance() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut controls = controls();
        controls.pan(Vec2::new(-50.0, 0.0), 600.0, 45.0);
        controls.update();
        assert!(controls.target().x > 0.0);
        assert!((controls.distance() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn disabled_gestures_are_ignored() {
        let config = OrbitControlsConfig {
            enable_zoom: false,
            enable_pan: false,
            enable_rotate: false,
            ..*Scene::compose().controls().unwrap()
        };
        let mut controls =
            OrbitControls::new(config, Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO).with_damping(0.0);
        controls.rotate(Vec2::new(120.0, 40.0), 600.0);
        controls.pan(Vec2::new(30.0, 30.0), 600.0, 45.0);
        controls.dolly(5.0);
        assert!(!controls.update());
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let scene = Scene::compose();
        let mut controls = OrbitControls::new(
            *scene.controls().unwrap(),
            scene.viewport().position,
            Vec3::ZERO,
        );
        controls.rotate(Vec2::new(200.0, 0.0), 600.0);
        controls.update();
        let first = controls.eye();
        assert!(controls.update());
        assert_ne!(first, controls.eye());
    }
}
