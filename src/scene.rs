//! Body collection with nearest-hit queries and direct shading.
//!
//! Shading is single bounce: Lambertian diffuse from each light, hard shadows
//! from one shadow ray per light, and a constant ambient floor. There is no
//! reflection or refraction. A body that is still being authored glows so the
//! user can tell it apart.

use glam::DVec3;

use crate::body::Body;
use crate::grid::SpacetimeGrid;
use crate::ray::{intersect, Ray};

pub const DEFAULT_LIGHT_POSITION: DVec3 = DVec3::new(5.0, 5.0, 5.0);
pub const DEFAULT_BACKGROUND: DVec3 = DVec3::new(0.0, 0.0, 0.1);
pub const DEFAULT_AMBIENT: f64 = 0.1;
pub const DEFAULT_SHADOW_BIAS: f64 = 1e-3;
/// Emission given to a body while it is being authored.
pub const AUTHORING_GLOW: f64 = 1.0;

/// Where direct light comes from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Illumination {
    /// One fixed point light.
    Point(DVec3),
    /// Every emissive body is a point light at its centre.
    EmissiveBodies,
}

impl Default for Illumination {
    fn default() -> Self {
        Illumination::Point(DEFAULT_LIGHT_POSITION)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub t: f64,
    pub point: DVec3,
    pub normal: DVec3,
    pub index: usize,
}

struct Light {
    position: DVec3,
    source: Option<usize>, // emitting body, ignored by its own shadow rays
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub bodies: Vec<Body>,
    pub illumination: Illumination,
    pub background: DVec3,
    pub ambient: f64,
    pub shadow_bias: f64,
    pub grid: SpacetimeGrid,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Scene {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            bodies,
            illumination: Illumination::default(),
            background: DEFAULT_BACKGROUND,
            ambient: DEFAULT_AMBIENT,
            shadow_bias: DEFAULT_SHADOW_BIAS,
            grid: SpacetimeGrid::default(),
        }
    }

    pub fn with_illumination(mut self, illumination: Illumination) -> Self {
        self.illumination = illumination;
        self
    }

    pub fn push(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn delete_last(&mut self) -> Option<Body> {
        self.bodies.pop()
    }

    /// The last body, if it is still being authored.
    pub fn authoring_mut(&mut self) -> Option<&mut Body> {
        self.bodies.last_mut().filter(|body| body.is_authoring())
    }

    /// Nearest positive intersection; the first body wins exact ties.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut nearest: Option<(f64, usize)> = None;

        for (index, body) in self.bodies.iter().enumerate() {
            if let Some(t) = intersect(ray, &body.sphere()) {
                if nearest.map_or(true, |(closest, _)| t < closest) {
                    nearest = Some((t, index));
                }
            }
        }

        nearest.map(|(t, index)| {
            let point = ray.at(t);
            Hit {
                t,
                point,
                normal: self.bodies[index].sphere().normal_at(point),
                index,
            }
        })
    }

    /// Whether any body other than `ignore` lies along `ray` within `max_t`.
    fn occluded(&self, ray: &Ray, max_t: f64, ignore: Option<usize>) -> bool {
        self.bodies.iter().enumerate().any(|(index, body)| {
            Some(index) != ignore && intersect(ray, &body.sphere()).map_or(false, |t| t < max_t)
        })
    }

    fn lights(&self) -> Vec<Light> {
        match self.illumination {
            Illumination::Point(position) => vec![Light { position, source: None }],
            Illumination::EmissiveBodies => self
                .bodies
                .iter()
                .enumerate()
                .filter(|(_, body)| body.material.is_emissive())
                .map(|(index, body)| Light {
                    position: body.position,
                    source: Some(index),
                })
                .collect(),
        }
    }

    pub fn trace(&self, ray: &Ray) -> DVec3 {
        self.trace_hit(ray).0
    }

    /// Shaded colour along `ray` together with the hit that produced it.
    pub fn trace_hit(&self, ray: &Ray) -> (DVec3, Option<Hit>) {
        let Some(hit) = self.nearest_hit(ray) else {
            return (self.background, None);
        };

        let body = &self.bodies[hit.index];
        let material = body.material;
        let glow = if body.is_authoring() {
            material.emission.max(AUTHORING_GLOW)
        } else {
            material.emission
        };
        let emissive = glow > 0.0;
        let origin = hit.point + hit.normal * self.shadow_bias;

        let mut diffuse = 0.0;
        let mut lit = false;
        for light in self.lights() {
            if light.source == Some(hit.index) {
                continue;
            }
            let to_light = light.position - hit.point;
            let light_dir = to_light.normalize_or_zero();
            let shadow_ray = Ray::new(origin, light_dir);

            // A fixed light has no body, so anything along the ray blocks it.
            let max_t = if light.source.is_some() { to_light.length() } else { f64::INFINITY };
            if !emissive && self.occluded(&shadow_ray, max_t, light.source) {
                continue;
            }
            lit = true;
            diffuse += hit.normal.dot(light_dir).max(0.0);
        }

        let mut color = if lit || emissive {
            material.color * (self.ambient + diffuse.min(1.0) * (1.0 - self.ambient))
        } else {
            material.color * self.ambient
        };
        if emissive {
            color += material.color * glow;
        }
        (color, Some(hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Material;

    #[test]
    fn test_empty_scene_returns_background() {
        let scene = Scene::default();
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z);
        assert_eq!(scene.trace(&ray), DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_first_body_wins_tie() {
        let sphere = Body::with_radius(DVec3::ZERO, 1.0, 5000.0, Material::default());
        let scene = Scene::new(vec![sphere.clone(), sphere]);
        let hit = scene.nearest_hit(&Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z)).unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn test_trace_hit_reports_depth() {
        let scene = Scene::new(vec![Body::with_radius(DVec3::ZERO, 1.0, 5000.0, Material::default())]);
        let (_, hit) = scene.trace_hit(&Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z));
        assert!((hit.unwrap().t - 4.0).abs() < 1e-9);
        assert!(scene.trace_hit(&Ray::new(DVec3::ZERO, DVec3::Y)).1.is_none());
    }

    #[test]
    fn test_authoring_mut_only_returns_authoring_body() {
        let mut scene = Scene::new(vec![Body::with_radius(DVec3::ZERO, 1.0, 5000.0, Material::default())]);
        assert!(scene.authoring_mut().is_none());
        scene.push(Body::authoring(DVec3::ZERO, 1e23, 5000.0, Material::default()));
        assert!(scene.authoring_mut().is_some());
    }
}
