//! Simulated sphere with mass, density and surface material.
//!
//! The radius is never stored: it is derived from mass and density every time
//! it is asked for, so growing a body's mass is immediately visible to the
//! ray tracer.

use glam::DVec3;
use std::f64::consts::PI;

use crate::ray::Sphere;

/// Physical metres per display unit of radius.
pub const DISPLAY_SCALE: f64 = 30_000.0;

pub const DEFAULT_DENSITY: f64 = 5000.0;

/// Surface response of a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: DVec3,    // rgb in [0, 1]
    pub specular: f64,   // [0, 1]
    pub emission: f64,   // >= 0
}

impl Material {
    pub fn new(color: DVec3, specular: f64, emission: f64) -> Self {
        Self {
            color: color.clamp(DVec3::ZERO, DVec3::ONE),
            specular: specular.clamp(0.0, 1.0),
            emission: emission.max(0.0),
        }
    }

    pub fn matte(color: DVec3) -> Self {
        Self::new(color, 0.5, 0.0)
    }

    pub fn emissive(color: DVec3, emission: f64) -> Self {
        Self::new(color, 0.0, emission)
    }

    pub fn is_emissive(&self) -> bool {
        self.emission > 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::matte(DVec3::new(1.0, 0.0, 0.0))
    }
}

/// Where a body is in the spawn gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BodyState {
    #[default]
    Free,
    /// Being created/resized by the user; exempt from gravity coupling.
    Authoring,
    /// Released this frame; exempt from coupling for one more tick.
    Launched,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub density: f64,
    pub material: Material,
    pub state: BodyState,
}

impl Body {
    pub fn new(position: DVec3, velocity: DVec3, mass: f64, density: f64, material: Material) -> Self {
        Self {
            position,
            velocity,
            mass,
            density,
            material,
            state: BodyState::Free,
        }
    }

    /// Body whose mass is chosen so that `radius()` returns `radius`.
    pub fn with_radius(position: DVec3, radius: f64, density: f64, material: Material) -> Self {
        let physical_radius = radius * DISPLAY_SCALE;
        let mass = 4.0 / 3.0 * PI * physical_radius.powi(3) * density;
        Self::new(position, DVec3::ZERO, mass, density, material)
    }

    /// Starts a spawn gesture at `position`.
    pub fn authoring(position: DVec3, mass: f64, density: f64, material: Material) -> Self {
        Self {
            state: BodyState::Authoring,
            ..Self::new(position, DVec3::ZERO, mass, density, material)
        }
    }

    pub fn radius(&self) -> f64 {
        (3.0 * self.mass / (4.0 * PI * self.density)).cbrt() / DISPLAY_SCALE
    }

    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.position, self.radius())
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    /// Multiplies the mass by `factor`. Non-finite or non-positive factors are ignored.
    pub fn grow(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.mass *= factor;
        }
    }

    pub fn is_authoring(&self) -> bool {
        self.state == BodyState::Authoring
    }

    /// Whether this body takes part in pairwise attraction this tick.
    pub fn is_coupled(&self) -> bool {
        self.state == BodyState::Free
    }

    pub fn release(&mut self, velocity: DVec3) {
        if self.is_authoring() {
            self.velocity = velocity;
            self.state = BodyState::Launched;
        }
    }
}
