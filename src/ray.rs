//! Rays and ray-sphere intersection.

use glam::DVec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3, // unit length, or zero for a degenerate ray
}

impl Ray {
    /// Normalizes `direction`. A zero or non-finite direction produces a ray
    /// that never hits anything.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == DVec3::ZERO
    }
}

/// Immutable sphere view used for intersection queries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Outward unit normal at `point`.
    pub fn normal_at(&self, point: DVec3) -> DVec3 {
        (point - self.center).normalize_or_zero()
    }
}

/// Smallest positive distance along `ray` to the surface of `sphere`.
///
/// The nearer root is preferred; when it lies behind the origin (the origin is
/// inside the sphere) the farther root is used instead.
pub fn intersect(ray: &Ray, sphere: &Sphere) -> Option<f64> {
    let oc = ray.origin - sphere.center;
    let a = ray.direction.dot(ray.direction);
    if a <= 0.0 {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-b - sqrt_d) / (2.0 * a);
    if near > 0.0 {
        return Some(near);
    }
    let far = (-b + sqrt_d) / (2.0 * a);
    if far > 0.0 {
        Some(far)
    } else {
        None
    }
}
