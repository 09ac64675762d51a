use cgmath::Deg;
use room_viewer::{
    camera::Projection,
    viewport::{Viewport, handle_resize},
};

fn setup() -> (Viewport, Projection) {
    (
        Viewport::default(),
        Projection::new(1, 1, Deg(50.0), 0.1, 100.0),
    )
}

#[test]
fn resize_is_idempotent() {
    let (mut viewport, mut projection) = setup();

    let first = handle_resize(&mut viewport, &mut projection, 1280.0, 720.0, 1.5);
    let after_first = (viewport, projection);
    let second = handle_resize(&mut viewport, &mut projection, 1280.0, 720.0, 1.5);

    assert_eq!(first, second);
    assert_eq!(after_first, (viewport, projection));
    assert_eq!(first, Some((1920, 1080)));
    assert!((projection.aspect() - 1280.0 / 720.0).abs() < 1e-6);
}

#[test]
fn pixel_ratio_is_capped_at_two() {
    let (mut viewport, mut projection) = setup();
    let size = handle_resize(&mut viewport, &mut projection, 800.0, 600.0, 3.0);

    assert_eq!(size, Some((1600, 1200)));
    assert_eq!(viewport.pixel_ratio(), 2.0);
    assert_eq!(viewport.scale_factor(), 3.0);
}

#[test]
fn fractional_sizes_are_rounded() {
    let (mut viewport, mut projection) = setup();
    let size = handle_resize(&mut viewport, &mut projection, 333.3, 200.5, 1.25);
    assert_eq!(size, Some((417, 251)));
}

#[test]
fn zero_sizes_are_ignored() {
    let (mut viewport, mut projection) = setup();
    handle_resize(&mut viewport, &mut projection, 640.0, 480.0, 1.0);
    let before = (viewport, projection);

    assert_eq!(handle_resize(&mut viewport, &mut projection, 0.0, 480.0, 1.0), None);
    assert_eq!(handle_resize(&mut viewport, &mut projection, 640.0, 0.0, 1.0), None);
    assert_eq!(before, (viewport, projection));
}
