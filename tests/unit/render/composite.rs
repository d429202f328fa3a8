use image::Rgb;

use super::*;

#[test]
fn over_transparent_is_identity_and_opaque_replaces() {
    assert_eq!(over_opaque([10, 20, 30], [0, 0, 0, 0]), [10, 20, 30]);
    assert_eq!(over_opaque([10, 20, 30], [200, 100, 50, 255]), [200, 100, 50]);
}

#[test]
fn over_half_white_on_black_is_mid_gray() {
    // Premultiplied white @ 50% is (128,128,128,128).
    assert_eq!(over_opaque([0, 0, 0], [128, 128, 128, 128]), [128, 128, 128]);
    assert_eq!(
        over_opaque([255, 255, 255], [128, 128, 128, 128]),
        [255, 255, 255]
    );
}

#[test]
fn blend_rect_mixes_inside_only() {
    let mut frame = RgbImage::from_pixel(4, 4, Rgb([100, 200, 50]));
    let rect = PixelRect {
        x: 1,
        y: 1,
        width: 2,
        height: 2,
    };
    blend_rect(&mut frame, rect, [0, 0, 0], 0.7);

    for y in 0..4 {
        for x in 0..4 {
            let expected = if rect.contains(x, y) {
                Rgb([30, 60, 15])
            } else {
                Rgb([100, 200, 50])
            };
            assert_eq!(*frame.get_pixel(x, y), expected, "pixel ({x},{y})");
        }
    }
}

#[test]
fn blend_rect_is_clipped_to_frame() {
    let mut frame = RgbImage::from_pixel(3, 3, Rgb([10, 10, 10]));
    let rect = PixelRect {
        x: 2,
        y: 2,
        width: 10,
        height: 10,
    };
    blend_rect(&mut frame, rect, [255, 255, 255], 1.0);
    assert_eq!(*frame.get_pixel(2, 2), Rgb([255, 255, 255]));
    assert_eq!(*frame.get_pixel(1, 1), Rgb([10, 10, 10]));
}

#[test]
fn over_premul_at_offsets_and_clips() {
    let mut frame = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
    // 2x2 overlay: opaque red, transparent, opaque green, opaque blue.
    let src = [
        255, 0, 0, 255, 0, 0, 0, 0, //
        0, 255, 0, 255, 0, 0, 255, 255,
    ];
    over_premul_at(&mut frame, &src, 2, 2, 2, 0).unwrap();

    assert_eq!(*frame.get_pixel(2, 0), Rgb([255, 0, 0]));
    assert_eq!(*frame.get_pixel(2, 1), Rgb([0, 255, 0]));
    assert_eq!(*frame.get_pixel(1, 0), Rgb([0, 0, 0]));
}

#[test]
fn over_premul_at_rejects_wrong_length() {
    let mut frame = RgbImage::new(2, 2);
    assert!(over_premul_at(&mut frame, &[0u8; 7], 1, 2, 0, 0).is_err());
}
