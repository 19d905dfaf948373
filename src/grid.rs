//! Warped spacetime grid drawn under the bodies.
//!
//! The grid is a square of line segments lying in a horizontal plane. Each
//! vertex sinks by the embedding depth `2 * sqrt(rs * (d - rs))`, doubled, of
//! every body, where `rs` is the body's Schwarzschild radius and `d` the
//! vertex-to-body distance in metres. A bilinear fit through the four corner
//! depths is subtracted again, so the edges stay at rest height and only the
//! wells around heavy bodies show.
//!
//! The tracer draws the lines as a translucent overlay: a primary ray is
//! covered when it passes within a fixed view angle of a segment that lies in
//! front of the nearest body.

use glam::DVec3;

use crate::body::Body;
use crate::integrator::GRAVITATIONAL_CONSTANT;
use crate::ray::Ray;

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
pub const MAX_GRID_DIVISIONS: u32 = 256;

#[derive(Clone, Debug, PartialEq)]
pub struct SpacetimeGrid {
    pub visible: bool,
    pub center: DVec3, // y is the rest height
    pub size: f64,
    pub divisions: u32,
    pub color: DVec3,
    pub opacity: f64,
    pub line_width: f64, // radians of view angle
    pub gravitational_constant: f64,
    pub meters_per_unit: f64,
}

impl Default for SpacetimeGrid {
    fn default() -> Self {
        Self {
            visible: false,
            center: DVec3::new(0.0, -8.0, -9.0),
            size: 40.0,
            divisions: 20,
            color: DVec3::ONE,
            opacity: 0.25,
            line_width: 0.003,
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            meters_per_unit: 1000.0,
        }
    }
}

impl SpacetimeGrid {
    pub fn schwarzschild_radius(&self, mass: f64) -> f64 {
        2.0 * self.gravitational_constant * mass / (SPEED_OF_LIGHT * SPEED_OF_LIGHT)
    }

    /// Summed embedding depth of all bodies at `point`, in display units.
    ///
    /// Bodies whose Schwarzschild radius reaches `point` contribute nothing.
    pub fn displacement(&self, point: DVec3, bodies: &[Body]) -> f64 {
        bodies
            .iter()
            .map(|body| {
                let rs = self.schwarzschild_radius(body.mass);
                let distance = point.distance(body.position) * self.meters_per_unit;
                if distance > rs {
                    4.0 * (rs * (distance - rs)).sqrt()
                } else {
                    0.0
                }
            })
            .filter(|depth| depth.is_finite())
            .sum()
    }

    fn divisions(&self) -> usize {
        self.divisions.clamp(1, MAX_GRID_DIVISIONS) as usize
    }

    fn rest_point(&self, x: f64, z: f64) -> DVec3 {
        DVec3::new(self.center.x + x, self.center.y, self.center.z + z)
    }

    /// Displaced vertices, `divisions + 1` per row, rows running along +Z.
    pub fn vertices(&self, bodies: &[Body]) -> Vec<DVec3> {
        let n = self.divisions();
        let half = self.size * 0.5;
        let step = self.size / n as f64;

        let corner = |x: f64, z: f64| self.displacement(self.rest_point(x, z), bodies);
        let lower_left = corner(-half, -half);
        let lower_right = corner(half, -half);
        let upper_left = corner(-half, half);
        let upper_right = corner(half, half);

        let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
        for row in 0..=n {
            let v = row as f64 / n as f64;
            let z = -half + row as f64 * step;
            for column in 0..=n {
                let u = column as f64 / n as f64;
                let x = -half + column as f64 * step;

                let point = self.rest_point(x, z);
                let baseline = (1.0 - u) * (1.0 - v) * lower_left
                    + u * (1.0 - v) * lower_right
                    + (1.0 - u) * v * upper_left
                    + u * v * upper_right;
                let depth = self.displacement(point, bodies) - baseline;
                vertices.push(point + DVec3::Y * depth);
            }
        }
        vertices
    }

    /// Line segments of the displaced grid for the current body positions.
    pub fn lines(&self, bodies: &[Body]) -> GridLines {
        let n = self.divisions();
        let vertices = self.vertices(bodies);
        let at = |row: usize, column: usize| vertices[row * (n + 1) + column];

        let mut segments = Vec::with_capacity(2 * n * (n + 1));
        for row in 0..=n {
            for column in 0..n {
                segments.push((at(row, column), at(row, column + 1)));
            }
        }
        for column in 0..=n {
            for row in 0..n {
                segments.push((at(row, column), at(row + 1, column)));
            }
        }

        GridLines {
            segments,
            color: self.color,
            opacity: self.opacity.clamp(0.0, 1.0),
            line_width: self.line_width,
        }
    }
}

/// Grid segments built for one frame.
#[derive(Clone, Debug)]
pub struct GridLines {
    segments: Vec<(DVec3, DVec3)>,
    color: DVec3,
    opacity: f64,
    line_width: f64,
}

impl GridLines {
    pub fn segments(&self) -> &[(DVec3, DVec3)] {
        &self.segments
    }

    /// Nearest distance along `ray`, below `max_t`, at which a line covers it.
    pub fn hit(&self, ray: &Ray, max_t: f64) -> Option<f64> {
        if ray.is_degenerate() {
            return None;
        }
        self.segments
            .iter()
            .filter_map(|&(a, b)| {
                let (t, distance) = closest_approach(ray, a, b);
                (t > 0.0 && t < max_t && distance <= self.line_width * t).then_some(t)
            })
            .min_by(f64::total_cmp)
    }

    /// Blends the line colour over `color` where a line lies in front of `max_t`.
    pub fn overlay(&self, ray: &Ray, max_t: f64, color: DVec3) -> DVec3 {
        match self.hit(ray, max_t) {
            Some(_) => color.lerp(self.color, self.opacity),
            None => color,
        }
    }
}

/// Ray parameter and distance of the closest approach between `ray` and the
/// segment `a..b`. The ray direction must be unit length.
fn closest_approach(ray: &Ray, a: DVec3, b: DVec3) -> (f64, f64) {
    let u = ray.direction;
    let v = b - a;
    let w = ray.origin - a;

    let uv = u.dot(v);
    let vv = v.dot(v);
    let uw = u.dot(w);
    let vw = v.dot(w);

    let denom = vv - uv * uv;
    let s = if vv <= 0.0 || denom <= 1e-12 * vv {
        0.0
    } else {
        ((vw - uw * uv) / denom).clamp(0.0, 1.0)
    };
    let t = (s * uv - uw).max(0.0);

    let distance = ray.at(t).distance(a + v * s);
    (t, distance)
}
