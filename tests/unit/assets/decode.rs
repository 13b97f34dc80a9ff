use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width(), 1);
    assert_eq!(decoded.height(), 1);
    assert_eq!(
        decoded.rgba8_premul(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn decode_svg_uses_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="12" height="7">
        <rect width="12" height="7" fill="#ff0000"/>
    </svg>"##;
    let decoded = decode_svg(svg, None).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 7));
    assert_eq!(&decoded.rgba8_premul()[0..4], &[255, 0, 0, 255]);

    assert!(decode_svg(b"<svg", None).is_err());
}

#[test]
fn unpremultiply_inverts_opaque_and_half_alpha() {
    let mut px = vec![10u8, 20, 30, 255, 64, 32, 0, 128, 9, 9, 9, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..8], &[128, 64, 0, 128]);
    assert_eq!(&px[8..12], &[9, 9, 9, 0]);
}
