use std::borrow::Cow;

use room_viewer::data_structures::material::ImageData;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageData {
    ImageData {
        width,
        height,
        rgba: rgba.repeat((width * height) as usize),
    }
}

#[test]
fn oversized_texture_shrinks_to_the_device_limit() {
    let image = solid(512, 256, [200, 40, 10, 255]);

    let fitted = image.fit_within(128).unwrap();
    assert!(matches!(fitted, Cow::Owned(_)));
    assert_eq!((fitted.width, fitted.height), (128, 64));
    assert_eq!(fitted.rgba.len(), 128 * 64 * 4);
    // a flat colour stays flat
    assert!(fitted.rgba.chunks_exact(4).all(|px| px == [200, 40, 10, 255]));
}

#[test]
fn tall_texture_keeps_its_aspect_ratio() {
    let image = solid(30, 300, [0, 0, 0, 255]);
    let fitted = image.fit_within(100).unwrap();
    assert_eq!((fitted.width, fitted.height), (10, 100));
}

#[test]
fn texture_within_limit_is_used_as_is() {
    let image = solid(64, 64, [1, 2, 3, 4]);
    let fitted = image.fit_within(64).unwrap();
    assert!(matches!(fitted, Cow::Borrowed(_)));
    assert_eq!(*fitted, image);
}

#[test]
fn empty_or_truncated_textures_are_rejected() {
    assert!(solid(0, 16, [0; 4]).fit_within(2048).is_err());
    assert!(solid(16, 0, [0; 4]).fit_within(2048).is_err());

    let truncated = ImageData {
        width: 4,
        height: 4,
        rgba: vec![255; 4 * 4 * 4 - 1],
    };
    assert!(truncated.fit_within(2048).is_err());
}
