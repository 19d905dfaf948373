use approx::assert_relative_eq;
use glam::DVec3;
use gravity_tracer::body::{Body, BodyState, Material, DEFAULT_DENSITY};

#[test]
fn test_with_radius_round_trips() {
    let body = Body::with_radius(DVec3::new(1.0, 2.0, 3.0), 2.5, DEFAULT_DENSITY, Material::default());
    assert_relative_eq!(body.radius(), 2.5, max_relative = 1e-12);
    assert_eq!(body.velocity, DVec3::ZERO);
    assert_eq!(body.state, BodyState::Free);
}

#[test]
fn test_grow_updates_radius_immediately() {
    let mut body = Body::with_radius(DVec3::ZERO, 1.0, DEFAULT_DENSITY, Material::default());
    let before = body.radius();

    body.grow(8.0);

    // Volume scales with mass, so eight times the mass doubles the radius.
    assert_relative_eq!(body.radius(), 2.0 * before, max_relative = 1e-12);
    assert_relative_eq!(body.sphere().radius, body.radius(), max_relative = 1e-15);
}

#[test]
fn test_grow_ignores_bad_factors() {
    let mut body = Body::with_radius(DVec3::ZERO, 1.0, DEFAULT_DENSITY, Material::default());
    let mass = body.mass;
    for factor in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        body.grow(factor);
    }
    assert_eq!(body.mass, mass);
}

#[test]
fn test_spawn_lifecycle() {
    let mut body = Body::authoring(DVec3::ZERO, 1.0e23, DEFAULT_DENSITY, Material::default());
    assert!(body.is_authoring());
    assert!(!body.is_coupled());

    body.release(DVec3::new(1.0, 0.0, 0.0));
    assert_eq!(body.state, BodyState::Launched);
    assert_eq!(body.velocity, DVec3::new(1.0, 0.0, 0.0));
    assert!(!body.is_coupled());

    // Releasing a body that is not being authored changes nothing.
    body.release(DVec3::new(9.0, 9.0, 9.0));
    assert_eq!(body.velocity, DVec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_momentum() {
    let body = Body::new(DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0), 3.0, 1.0, Material::default());
    assert_eq!(body.momentum(), DVec3::new(0.0, 6.0, 0.0));
}
