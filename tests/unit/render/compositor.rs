use std::path::PathBuf;

use super::*;
use crate::assets::color::ColorDef;
use crate::config::settings::{ImageSettingsDef, SettingsDef, TextSettingsDef};

const FONT_PATH: &str = "tests/data/fonts/DejaVuSans.ttf";

fn settings(width: u32, height: u32, format: &str) -> Settings {
    let def = SettingsDef {
        text: TextSettingsDef {
            font: Some("32px DejaVu Sans".to_owned()),
            font_source: Some(PathBuf::from(FONT_PATH)),
            color: Some(ColorDef::rgba(1.0, 1.0, 1.0, 1.0)),
        },
        image: ImageSettingsDef {
            format: Some(format.to_owned()),
            quality: None,
            padding: Some(10.0),
        },
    };
    Settings::resolve(&def, width, height).unwrap()
}

fn compositor_if_font_present(width: u32, height: u32, format: &str) -> Option<Compositor> {
    if !std::path::Path::new(FONT_PATH).is_file() {
        return None;
    }
    Some(Compositor::from_settings(&settings(width, height, format)).unwrap())
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> SourceImage {
    SourceImage::from_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn anchor_is_right_aligned_with_padding() {
    let p = caption_anchor(300.0, 200.0, 120.0, 30.0);
    assert_eq!((p.x, p.y), (150.0, 170.0));
}

#[test]
fn oversized_surfaces_are_rejected() {
    assert!(surface_dims(70_000, 10).is_err());
    assert!(surface_dims(0, 10).is_err());
    assert_eq!(surface_dims(640, 480).unwrap(), (640, 480));
}

#[test]
fn small_image_is_stretched_to_fill_the_surface() {
    let Some(mut comp) = compositor_if_font_present(64, 32, "image/png") else {
        return;
    };
    let img = solid(2, 2, [0, 0, 255, 255]);
    let frame = comp.render(&img, "").unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    for (x, y) in [(0, 0), (63, 0), (0, 31), (63, 31), (32, 16)] {
        assert_eq!(px(&frame, x, y), [0, 0, 255, 255], "pixel {x},{y}");
    }
}

#[test]
fn caption_pixels_land_in_the_bottom_right_region() {
    let Some(mut comp) = compositor_if_font_present(200, 100, "image/png") else {
        return;
    };
    let img = solid(10, 10, [0, 0, 0, 255]);
    let frame = comp.render(&img, "Hi").unwrap();

    let text_w = comp.measure("Hi");
    let left = (200.0 - text_w - 10.0).floor() as u32;
    let mut lit_inside = 0usize;
    for y in 0..100 {
        for x in 0..200 {
            let p = px(&frame, x, y);
            if p[0] > 128 {
                assert!(x + 1 >= left, "lit pixel left of caption at {x},{y}");
                assert!(x < 191, "lit pixel inside right padding at {x},{y}");
                assert!(y < 91, "lit pixel below baseline padding at {x},{y}");
                lit_inside += 1;
            }
        }
    }
    assert!(lit_inside > 20);
}

#[test]
fn compose_is_idempotent_and_repaints_fully() {
    let Some(mut comp) = compositor_if_font_present(120, 60, "image/jpeg") else {
        return;
    };
    let img = solid(4, 4, [200, 30, 30, 255]);

    let a = comp.compose(&img, "Signed").unwrap();
    let _other = comp.compose(&img, "Something else").unwrap();
    let b = comp.compose(&img, "Signed").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.mime(), "image/jpeg");

    let decoded = image::load_from_memory(a.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 60));
}

#[test]
fn fit_uses_surface_width_and_padding() {
    let Some(mut comp) = compositor_if_font_present(80, 40, "image/png") else {
        return;
    };
    let text = "This caption is far too long for an eighty pixel surface";
    let fitted = comp.fit(text);
    assert!(text.starts_with(&fitted));
    assert!(fitted.len() < text.len());
    assert!(fitted.is_empty() || comp.measure(&fitted) <= 60.0);
}

#[test]
fn trailing_spaces_shift_the_caption_left() {
    let Some(mut comp) = compositor_if_font_present(200, 100, "image/png") else {
        return;
    };
    let img = solid(10, 10, [0, 0, 0, 255]);
    assert!(comp.measure("Hi   ") > comp.measure("Hi"));

    let plain = comp.compose(&img, "Hi").unwrap();
    let spaced = comp.compose(&img, "Hi   ").unwrap();
    assert_ne!(plain, spaced);
}
