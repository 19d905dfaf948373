use gravity_tracer::camera::OrbitCamera;
use gravity_tracer::input::{Button, CameraController, Modifiers, PointerTracker, ResolutionPolicy};
use std::time::{Duration, Instant};

#[test]
fn test_drag_orbits_camera() {
    let mut controller = CameraController::default();
    let mut camera = OrbitCamera::default();

    controller.button_pressed(Button::Middle);
    assert!(controller.is_dragging());
    controller.pointer_moved(&mut camera, 10.0, 5.0, Modifiers::NONE);

    assert_eq!(camera.yaw(), 94.0);
    assert_eq!(camera.pitch(), 2.0);
    assert_eq!(camera.target(), OrbitCamera::default().target());
}

#[test]
fn test_shift_drag_pans_camera() {
    let mut controller = CameraController::default();
    let mut camera = OrbitCamera::default();

    controller.button_pressed(Button::Middle);
    controller.pointer_moved(&mut camera, 10.0, 5.0, Modifiers::SHIFT);

    assert_eq!(camera.yaw(), 90.0);
    assert_ne!(camera.target(), OrbitCamera::default().target());
}

#[test]
fn test_other_buttons_do_not_drag() {
    let mut controller = CameraController::default();
    let mut camera = OrbitCamera::default();

    controller.button_pressed(Button::Left);
    controller.button_pressed(Button::Right);
    controller.pointer_moved(&mut camera, 10.0, 5.0, Modifiers::NONE);
    assert_eq!(camera, OrbitCamera::default());

    controller.button_pressed(Button::Middle);
    controller.button_released(Button::Middle);
    controller.pointer_moved(&mut camera, 10.0, 5.0, Modifiers::NONE);
    assert_eq!(camera, OrbitCamera::default());
}

#[test]
fn test_configurable_drag_button() {
    let mut controller = CameraController::new(Button::Left);
    let mut camera = OrbitCamera::default();
    controller.button_pressed(Button::Left);
    controller.pointer_moved(&mut camera, -5.0, 0.0, Modifiers::NONE);
    assert_eq!(camera.yaw(), 88.0);
}

#[test]
fn test_scroll_zooms_and_counts_as_motion() {
    let mut controller = CameraController::default();
    let mut camera = OrbitCamera::default();

    controller.scrolled(&mut camera, 1.0);

    assert_eq!(camera.distance(), 13.0);
    let elapsed = controller.since_last_motion(Instant::now()).unwrap();
    assert!(elapsed < Duration::from_secs(1));
}

#[test]
fn test_pointer_tracker_reports_deltas() {
    let mut tracker = PointerTracker::default();
    assert_eq!(tracker.sample(100.0, 100.0), None);
    assert_eq!(tracker.sample(110.0, 95.0), Some((10.0, -5.0)));
    assert_eq!(tracker.sample(110.0, 95.0), Some((0.0, 0.0)));
}

#[test]
fn test_resolution_drops_while_moving() {
    let policy = ResolutionPolicy::new(800, 600);

    assert_eq!(policy.render_size(None), (400, 300));
    assert_eq!(policy.render_size(Some(Duration::from_millis(50))), (200, 150));
    assert_eq!(policy.render_size(Some(Duration::from_millis(199))), (200, 150));
    assert_eq!(policy.render_size(Some(Duration::from_millis(200))), (400, 300));
    assert_eq!(policy.render_size(Some(Duration::from_secs(5))), (400, 300));
}

#[test]
fn test_resolution_never_reaches_zero() {
    let policy = ResolutionPolicy::new(3, 1);
    assert_eq!(policy.render_size(Some(Duration::ZERO)), (1, 1));

    let mut zero_divisor = ResolutionPolicy::new(10, 10);
    zero_divisor.idle_divisor = 0;
    assert_eq!(zero_divisor.render_size(None), (10, 10));
}
