//! Pairwise Newtonian gravity with an explicit Euler step.
//!
//! Velocities and positions are advanced with separate divisors, so the step
//! is not physically normalized: `velocity_divisor` and `position_divisor`
//! are damping knobs tuned for a 60 Hz tick. Frame time is converted into
//! reference ticks before it is applied, so the motion does not depend on the
//! frame rate.
//!
//! Accelerations from every pair are summed before any velocity changes, so
//! the result does not depend on body order.

use glam::DVec3;
use serde::Deserialize;

use crate::body::{Body, BodyState};

pub const GRAVITATIONAL_CONSTANT: f64 = 6.6743e-11;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntegratorParams {
    pub gravitational_constant: f64,
    pub meters_per_unit: f64,
    pub velocity_divisor: f64,
    pub position_divisor: f64,
    pub reference_rate: f64,   // ticks per second the divisors were tuned for
    pub max_dt: f64,           // longest frame time integrated in one step
    pub min_separation: f64,   // metres
    pub collision_damping: Option<f64>,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            meters_per_unit: 1000.0,
            velocity_divisor: 96.0,
            position_divisor: 94.0,
            reference_rate: 60.0,
            max_dt: 0.25,
            min_separation: 1e-9,
            collision_damping: None,
        }
    }
}

impl IntegratorParams {
    pub fn with_collision_damping(mut self, factor: f64) -> Self {
        self.collision_damping = Some(factor);
        self
    }

    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = max_dt;
        self
    }

    /// Frame time expressed in reference ticks; zero for unusable input.
    pub fn tick_scale(&self, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        dt.min(self.max_dt).max(0.0) * self.reference_rate
    }
}

#[derive(Clone, Debug, Default)]
pub struct GravityIntegrator {
    pub params: IntegratorParams,
}

impl GravityIntegrator {
    pub fn new(params: IntegratorParams) -> Self {
        Self { params }
    }

    /// Advances every body by a frame of `dt` seconds.
    pub fn step(&self, bodies: &mut [Body], dt: f64) {
        let tick_scale = self.params.tick_scale(dt);
        if tick_scale == 0.0 || bodies.is_empty() {
            return;
        }

        let accelerations = self.accelerations(bodies);

        if let Some(factor) = self.params.collision_damping {
            self.apply_collision_damping(bodies, factor);
        }

        let velocity_scale = tick_scale / self.params.velocity_divisor;
        let position_scale = tick_scale / self.params.position_divisor;

        for (body, acceleration) in bodies.iter_mut().zip(accelerations) {
            if body.is_coupled() {
                body.velocity += acceleration * velocity_scale;
            }
            if !body.is_authoring() {
                body.position += body.velocity * position_scale;
            }
            if body.state == BodyState::Launched {
                body.state = BodyState::Free;
            }
        }
    }

    /// Net gravitational acceleration on each body, in m/s².
    ///
    /// Bodies that are not coupled neither attract nor receive attraction.
    pub fn accelerations(&self, bodies: &[Body]) -> Vec<DVec3> {
        let mut accelerations = vec![DVec3::ZERO; bodies.len()];

        for (i, body) in bodies.iter().enumerate() {
            if !body.is_coupled() {
                continue;
            }
            for (j, other) in bodies.iter().enumerate() {
                if i == j || !other.is_coupled() {
                    continue;
                }
                if let Some(acceleration) = self.pair_acceleration(body, other) {
                    accelerations[i] += acceleration;
                }
            }
        }

        accelerations
    }

    fn pair_acceleration(&self, body: &Body, other: &Body) -> Option<DVec3> {
        let offset = other.position - body.position;
        let distance = offset.length() * self.params.meters_per_unit;
        if !distance.is_finite() || distance <= self.params.min_separation {
            return None;
        }

        let force = self.params.gravitational_constant * body.mass * other.mass / (distance * distance);
        let acceleration = offset.normalize_or_zero() * (force / body.mass);
        acceleration.is_finite().then_some(acceleration)
    }

    fn apply_collision_damping(&self, bodies: &mut [Body], factor: f64) {
        let overlapping: Vec<bool> = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                body.is_coupled()
                    && bodies.iter().enumerate().any(|(j, other)| {
                        i != j
                            && other.is_coupled()
                            && body.position.distance(other.position) < body.radius() + other.radius()
                    })
            })
            .collect();

        for (body, overlaps) in bodies.iter_mut().zip(overlapping) {
            if overlaps {
                body.velocity *= factor;
            }
        }
    }

    /// Velocity (in integrator units) that keeps a light body on a circular
    /// orbit of `radius_units` around `central_mass`.
    pub fn circular_orbit_speed(&self, central_mass: f64, radius_units: f64) -> f64 {
        if radius_units <= 0.0 {
            return 0.0;
        }
        let distance = radius_units * self.params.meters_per_unit;
        let acceleration = self.params.gravitational_constant * central_mass / (distance * distance);
        (radius_units * acceleration * self.params.position_divisor / self.params.velocity_divisor).sqrt()
    }
}

pub fn total_momentum(bodies: &[Body]) -> DVec3 {
    bodies.iter().map(Body::momentum).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Material;

    fn body_at(x: f64, mass: f64) -> Body {
        Body::new(DVec3::new(x, 0.0, 0.0), DVec3::ZERO, mass, 5000.0, Material::default())
    }

    #[test]
    fn test_tick_scale_clamps() {
        let params = IntegratorParams::default();
        assert_eq!(params.tick_scale(-1.0), 0.0);
        assert_eq!(params.tick_scale(f64::NAN), 0.0);
        assert!((params.tick_scale(1.0 / 60.0) - 1.0).abs() < 1e-12);
        assert!((params.tick_scale(10.0) - 15.0).abs() < 1e-12);
        assert_eq!(params.clone().with_max_dt(-1.0).tick_scale(1.0 / 60.0), 0.0);
    }

    #[test]
    fn test_coincident_bodies_exert_no_force() {
        let integrator = GravityIntegrator::default();
        let bodies = vec![body_at(0.0, 1e20), body_at(0.0, 1e20)];
        let accelerations = integrator.accelerations(&bodies);
        assert_eq!(accelerations, vec![DVec3::ZERO, DVec3::ZERO]);
    }

    #[test]
    fn test_order_independent() {
        let integrator = GravityIntegrator::default();
        let forward = vec![body_at(-1.0, 1e20), body_at(1.0, 3e20), body_at(4.0, 2e20)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = integrator.accelerations(&forward);
        let mut b = integrator.accelerations(&reversed);
        b.reverse();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((*x - *y).length() < 1e-12 * x.length().max(1.0));
        }
    }
}
