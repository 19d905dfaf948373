//! Orbit camera with spherical coordinates.
//!
//! Y-up coordinate system. Yaw is horizontal, pitch is vertical (clamped to
//! prevent gimbal lock at the poles). Angles are in degrees. The eye position
//! is always derived from target, distance, yaw and pitch, never stored.

use glam::DVec3;

use crate::ray::Ray;

const UP_VECTOR: DVec3 = DVec3::Y;
const MAX_PITCH: f64 = 89.0;
const MIN_PITCH: f64 = -89.0;

pub const DEFAULT_FOV_DEGREES: f64 = 90.0;
pub const DEFAULT_MIN_DISTANCE: f64 = 1.0;
pub const DEFAULT_ORBIT_SENSITIVITY: f64 = 0.4;
pub const DEFAULT_ZOOM_SPEED: f64 = 2.0;
pub const DEFAULT_PAN_FACTOR: f64 = 0.005;

/// Orthonormal view basis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    target: DVec3,
    distance: f64,
    yaw: f64,
    pitch: f64,
    fov: f64,
    min_distance: f64,
    pub orbit_sensitivity: f64, // degrees per pointer unit
    pub zoom_speed: f64,        // distance per scroll unit
    pub pan_factor: f64,        // pan speed per unit of distance
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DVec3::new(0.0, 0.0, -9.0), 15.0, 90.0, 0.0)
    }
}

impl OrbitCamera {
    pub fn new(target: DVec3, distance: f64, yaw: f64, pitch: f64) -> Self {
        Self {
            target,
            distance: distance.max(DEFAULT_MIN_DISTANCE),
            yaw,
            pitch: pitch.clamp(MIN_PITCH, MAX_PITCH),
            fov: DEFAULT_FOV_DEGREES,
            min_distance: DEFAULT_MIN_DISTANCE,
            orbit_sensitivity: DEFAULT_ORBIT_SENSITIVITY,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            pan_factor: DEFAULT_PAN_FACTOR,
        }
    }

    pub fn with_fov(mut self, fov: f64) -> Self {
        if fov.is_finite() {
            self.fov = fov.clamp(1.0, 179.0);
        }
        self
    }

    /// Sets the zoom floor. Values that are not strictly positive are ignored.
    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        if min_distance.is_finite() && min_distance > 0.0 {
            self.min_distance = min_distance;
            self.distance = self.distance.max(min_distance);
        }
        self
    }

    pub fn target(&self) -> DVec3 {
        self.target
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn orbit(&mut self, delta_x: f64, delta_y: f64) {
        if !(delta_x.is_finite() && delta_y.is_finite()) {
            return;
        }
        self.yaw += delta_x * self.orbit_sensitivity;
        self.pitch = (self.pitch + delta_y * self.orbit_sensitivity).clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn pan(&mut self, delta_x: f64, delta_y: f64) {
        if !(delta_x.is_finite() && delta_y.is_finite()) {
            return;
        }
        let basis = self.basis();
        let speed = self.pan_factor * self.distance;
        self.target += -basis.right * delta_x * speed + basis.up * delta_y * speed;
    }

    pub fn zoom(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.distance = (self.distance - delta * self.zoom_speed).max(self.min_distance);
    }

    pub fn position(&self) -> DVec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        self.target
            + self.distance
                * DVec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
    }

    pub fn basis(&self) -> CameraBasis {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(UP_VECTOR).normalize();
        let up = right.cross(forward);
        CameraBasis { forward, right, up }
    }

    /// Pinhole ray through the centre of pixel `(x, y)`; row 0 is the top.
    pub fn primary_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        self.primary_ray_with(&self.basis(), x, y, width, height)
    }

    /// Same as [`primary_ray`](Self::primary_ray) with a precomputed basis.
    pub fn primary_ray_with(&self, basis: &CameraBasis, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let width = width.max(1) as f64;
        let height = height.max(1) as f64;
        let scale = (self.fov * 0.5).to_radians().tan();
        let aspect_ratio = width / height;

        let u = (x as f64 + 0.5) / width;
        let v = (y as f64 + 0.5) / height;
        let x_camera = (2.0 * u - 1.0) * aspect_ratio * scale;
        let y_camera = (1.0 - 2.0 * v) * scale;

        let direction = x_camera * basis.right + y_camera * basis.up + basis.forward;
        Ray::new(self.position(), direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_matches_target_offset() {
        let camera = OrbitCamera::default();
        let position = camera.position();
        assert!((position - DVec3::new(0.0, 0.0, 6.0)).length() < 1e-9);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let mut camera = OrbitCamera::default();
        camera.orbit(37.0, -12.0);
        let basis = camera.basis();
        assert!(basis.forward.dot(basis.right).abs() < 1e-9);
        assert!(basis.forward.dot(basis.up).abs() < 1e-9);
        assert!((basis.up.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_distance_ignores_non_positive() {
        let camera = OrbitCamera::default().with_min_distance(0.0);
        assert_eq!(camera.min_distance(), DEFAULT_MIN_DISTANCE);
    }
}
