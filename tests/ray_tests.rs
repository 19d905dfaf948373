use approx::assert_relative_eq;
use glam::DVec3;
use gravity_tracer::ray::{intersect, Ray, Sphere};

#[test]
fn test_unit_sphere_hit_distance_and_normal() {
    let sphere = Sphere::new(DVec3::ZERO, 1.0);
    let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));

    let t = intersect(&ray, &sphere).expect("ray should hit the sphere");
    assert_relative_eq!(t, 4.0, epsilon = 1e-12);

    let normal = sphere.normal_at(ray.at(t));
    assert_relative_eq!(normal.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(normal.y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(normal.z, 1.0, epsilon = 1e-12);
}

#[test]
fn test_hit_point_lies_on_surface() {
    let spheres = [
        Sphere::new(DVec3::new(0.0, -5.0, -9.0), 2.0),
        Sphere::new(DVec3::new(5.0, -2.0, -11.0), 1.5),
        Sphere::new(DVec3::new(-2.0, -1.0, -6.0), 1.0),
    ];
    let origin = DVec3::new(0.3, 0.7, 6.0);

    for sphere in &spheres {
        // Aim at a few points around each sphere; only some of them hit.
        for offset in [DVec3::ZERO, DVec3::new(0.5, 0.2, 0.0), DVec3::new(-0.9, 0.1, 0.3)] {
            let ray = Ray::new(origin, sphere.center + offset * sphere.radius - origin);
            if let Some(t) = intersect(&ray, sphere) {
                let distance = ray.at(t).distance(sphere.center);
                assert!((distance - sphere.radius).abs() < 1e-9, "off surface by {}", distance - sphere.radius);
            }
        }
    }
}

#[test]
fn test_intersect_is_idempotent() {
    let sphere = Sphere::new(DVec3::new(1.0, 2.0, -7.0), 1.3);
    let ray = Ray::new(DVec3::new(0.0, 0.0, 3.0), DVec3::new(0.1, 0.2, -1.0));
    assert_eq!(intersect(&ray, &sphere), intersect(&ray, &sphere));
}

#[test]
fn test_miss_returns_none() {
    let sphere = Sphere::new(DVec3::ZERO, 1.0);
    let ray = Ray::new(DVec3::new(0.0, 3.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
    assert!(intersect(&ray, &sphere).is_none());
}

#[test]
fn test_sphere_behind_origin_is_not_hit() {
    let sphere = Sphere::new(DVec3::new(0.0, 0.0, 10.0), 1.0);
    let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
    assert!(intersect(&ray, &sphere).is_none());
}

#[test]
fn test_tangent_ray_hits_once() {
    let sphere = Sphere::new(DVec3::ZERO, 1.0);
    let ray = Ray::new(DVec3::new(1.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
    let t = intersect(&ray, &sphere).expect("tangent ray should graze the sphere");
    assert_relative_eq!(t, 5.0, epsilon = 1e-9);
}

#[test]
fn test_degenerate_ray_never_hits() {
    let ray = Ray::new(DVec3::ZERO, DVec3::ZERO);
    assert!(ray.is_degenerate());
    assert!(intersect(&ray, &Sphere::new(DVec3::ZERO, 1.0)).is_none());

    let nan_ray = Ray::new(DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 1.0));
    assert!(intersect(&nan_ray, &Sphere::new(DVec3::new(0.0, 0.0, 5.0), 1.0)).is_none());
}

#[test]
fn test_zero_radius_sphere_is_invisible_off_axis() {
    let sphere = Sphere::new(DVec3::new(0.0, 0.0, -5.0), 0.0);
    let ray = Ray::new(DVec3::new(0.1, 0.0, 0.0), DVec3::new(0.0, 0.0, -1.0));
    assert!(intersect(&ray, &sphere).is_none());
}
