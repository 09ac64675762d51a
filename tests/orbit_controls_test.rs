use std::f32::consts::PI;

use cgmath::{InnerSpace, MetricSpace, Point3};
use room_viewer::{camera::Camera, controls::OrbitControls, scene};

fn polar_angle(camera: &Camera, target: Point3<f32>) -> f32 {
    let offset = camera.position - target;
    (offset.y / offset.magnitude()).acos()
}

#[test]
fn damped_rotation_settles_with_shrinking_steps() {
    let mut camera = scene::initial_camera();
    let mut controls = scene::initial_controls();
    let target = controls.target;
    let radius = camera.position.distance(target);

    controls.rotate_left(0.5);
    let mut previous_step = f32::INFINITY;
    for _ in 0..60 {
        let before = camera.position;
        assert!(controls.update(&mut camera));
        let step = camera.position.distance(before);
        assert!(step > 0.0);
        assert!(step < previous_step, "step {step} did not shrink below {previous_step}");
        previous_step = step;

        assert!((camera.position.distance(target) - radius).abs() < 1e-3);
        assert_eq!(camera.target, target);
    }
}

#[test]
fn damped_rotation_eventually_stops() {
    let mut camera = scene::initial_camera();
    let mut controls = scene::initial_controls();
    controls.rotate_up(0.2);
    for _ in 0..1000 {
        controls.update(&mut camera);
    }
    let rest = camera.position;
    assert!(!controls.update(&mut camera));
    assert_eq!(camera.position, rest);
}

#[test]
fn polar_angle_stays_inside_the_open_range() {
    let mut camera = scene::initial_camera();
    let mut controls = OrbitControls::new(scene::CAMERA_TARGET);
    let target = controls.target;

    controls.rotate_up(10.0);
    controls.update(&mut camera);
    let phi = polar_angle(&camera, target);
    assert!(phi > 0.0 && phi < PI, "phi {phi}");

    controls.rotate_up(-20.0);
    controls.update(&mut camera);
    let phi = polar_angle(&camera, target);
    assert!(phi > 0.0 && phi < PI, "phi {phi}");
}

#[test]
fn undamped_rotation_is_applied_at_once() {
    let mut camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));

    // rotating left by a quarter turn moves the camera from +z to -x
    controls.rotate_left(PI / 2.0);
    controls.update(&mut camera);
    assert!((camera.position.x + 5.0).abs() < 1e-4, "{:?}", camera.position);
    assert!(camera.position.z.abs() < 1e-4, "{:?}", camera.position);
    assert!(!controls.update(&mut camera));
}

#[test]
fn scrolling_up_moves_closer() {
    let mut camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));

    controls.dolly(1.0);
    controls.update(&mut camera);
    assert!((camera.position.z - 9.5).abs() < 1e-4);

    controls.dolly(-2.0);
    controls.update(&mut camera);
    assert!((camera.position.z - 9.5 / (0.95 * 0.95)).abs() < 1e-3);
}

#[test]
fn dolly_respects_distance_limits() {
    let mut camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.min_distance = 8.0;

    controls.dolly(20.0);
    controls.update(&mut camera);
    assert!((camera.position.z - 8.0).abs() < 1e-4);
}

#[test]
fn panning_moves_target_and_camera_together() {
    let mut camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    let offset_before = camera.position - controls.target;

    controls.pan_by_pixels(&camera, cgmath::Rad::from(cgmath::Deg(50.0f32)), 100.0, 0.0, 600.0);
    controls.update(&mut camera);

    // dragging right pulls the scene right, so the camera moves left
    assert!(controls.target.x < 0.0);
    let offset_after = camera.position - controls.target;
    assert!((offset_after - offset_before).magnitude() < 1e-4);
}
