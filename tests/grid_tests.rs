use approx::assert_relative_eq;
use glam::DVec3;
use gravity_tracer::body::{Body, Material, DEFAULT_DENSITY};
use gravity_tracer::grid::{SpacetimeGrid, SPEED_OF_LIGHT};
use gravity_tracer::integrator::GRAVITATIONAL_CONSTANT;
use gravity_tracer::ray::Ray;

fn flat_grid(size: f64, divisions: u32) -> SpacetimeGrid {
    SpacetimeGrid {
        visible: true,
        center: DVec3::ZERO,
        size,
        divisions,
        ..SpacetimeGrid::default()
    }
}

fn heavy_body(position: DVec3) -> Body {
    Body::new(position, DVec3::ZERO, 1.0e24, DEFAULT_DENSITY, Material::default())
}

#[test]
fn test_displacement_matches_embedding_depth() {
    let grid = SpacetimeGrid::default();
    let body = heavy_body(DVec3::new(0.0, 0.0, 10.0));

    let rs = 2.0 * GRAVITATIONAL_CONSTANT * body.mass / (SPEED_OF_LIGHT * SPEED_OF_LIGHT);
    let distance_m = 10.0 * 1000.0;
    let expected = 2.0 * (rs * (distance_m - rs)).sqrt() * 2.0;

    assert_relative_eq!(grid.schwarzschild_radius(body.mass), rs, max_relative = 1e-12);
    assert_relative_eq!(grid.displacement(DVec3::ZERO, &[body]), expected, max_relative = 1e-12);
}

#[test]
fn test_displacement_sums_bodies() {
    let grid = SpacetimeGrid::default();
    let a = heavy_body(DVec3::new(5.0, 0.0, 0.0));
    let b = heavy_body(DVec3::new(0.0, 0.0, -7.0));
    let sum = grid.displacement(DVec3::ZERO, &[a.clone()]) + grid.displacement(DVec3::ZERO, &[b.clone()]);
    assert_relative_eq!(grid.displacement(DVec3::ZERO, &[a, b]), sum, max_relative = 1e-12);
}

#[test]
fn test_point_inside_schwarzschild_radius_is_ignored() {
    let grid = SpacetimeGrid::default();
    // rs is two kilometres, twice the one unit separation.
    let mass = 2000.0 * SPEED_OF_LIGHT * SPEED_OF_LIGHT / (2.0 * GRAVITATIONAL_CONSTANT);
    let body = Body::new(DVec3::X, DVec3::ZERO, mass, DEFAULT_DENSITY, Material::default());
    assert_eq!(grid.displacement(DVec3::ZERO, &[body]), 0.0);
}

#[test]
fn test_empty_grid_is_flat() {
    let grid = SpacetimeGrid { center: DVec3::new(1.0, -4.0, 2.0), ..flat_grid(10.0, 4) };
    let vertices = grid.vertices(&[]);
    assert_eq!(vertices.len(), 25);
    assert!(vertices.iter().all(|v| v.y == -4.0));
    assert_eq!(vertices[0], DVec3::new(-4.0, -4.0, -3.0));
    assert_eq!(vertices[24], DVec3::new(6.0, -4.0, 7.0));
}

#[test]
fn test_body_sinks_grid_centre_and_keeps_corners_level() {
    let grid = flat_grid(40.0, 4);
    let vertices = grid.vertices(&[heavy_body(DVec3::new(0.0, 5.0, 0.0))]);

    for corner in [0, 4, 20, 24] {
        assert_relative_eq!(vertices[corner].y, 0.0, epsilon = 1e-9);
    }
    let centre = vertices[12];
    assert_eq!((centre.x, centre.z), (0.0, 0.0));
    assert!(centre.y < -1.0, "centre should sink, got {}", centre.y);
    // The well is deepest under the body.
    assert!(vertices.iter().all(|v| v.y >= centre.y));
}

#[test]
fn test_lines_connect_neighbouring_vertices() {
    let grid = flat_grid(2.0, 2);
    let lines = grid.lines(&[]);
    assert_eq!(lines.segments().len(), 12);
    for (a, b) in lines.segments() {
        assert_relative_eq!(a.distance(*b), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_ray_onto_line_hits() {
    let lines = flat_grid(2.0, 2).lines(&[]);

    let crossing = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::NEG_Y);
    assert_relative_eq!(lines.hit(&crossing, f64::INFINITY).unwrap(), 5.0, epsilon = 1e-9);

    let along_edge = Ray::new(DVec3::new(0.5, 5.0, 0.0), DVec3::NEG_Y);
    assert!(lines.hit(&along_edge, f64::INFINITY).is_some());
}

#[test]
fn test_ray_between_lines_misses() {
    let lines = flat_grid(2.0, 2).lines(&[]);
    let ray = Ray::new(DVec3::new(0.5, 5.0, 0.5), DVec3::NEG_Y);
    assert!(lines.hit(&ray, f64::INFINITY).is_none());
}

#[test]
fn test_lines_behind_nearer_surface_are_hidden() {
    let lines = flat_grid(2.0, 2).lines(&[]);
    let ray = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::NEG_Y);
    assert!(lines.hit(&ray, 4.0).is_none());
    assert_eq!(lines.overlay(&ray, 4.0, DVec3::X), DVec3::X);
}

#[test]
fn test_overlay_blends_line_colour() {
    let grid = SpacetimeGrid { color: DVec3::ONE, opacity: 0.25, ..flat_grid(2.0, 2) };
    let lines = grid.lines(&[]);
    let ray = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::NEG_Y);

    let color = lines.overlay(&ray, f64::INFINITY, DVec3::ZERO);
    assert_relative_eq!(color.x, 0.25, epsilon = 1e-12);
    assert_relative_eq!(color.y, 0.25, epsilon = 1e-12);
    assert_relative_eq!(color.z, 0.25, epsilon = 1e-12);
}
