use super::*;
use serde_json::json;

#[test]
fn parses_named_colors_case_insensitively() {
    let c: ColorDef = serde_json::from_value(json!("white")).unwrap();
    assert_eq!(c.to_rgba8(), [255, 255, 255, 255]);

    let c: ColorDef = "Navy".parse().unwrap();
    assert_eq!(c.to_rgba8(), [0, 0, 128, 255]);

    let c: ColorDef = "transparent".parse().unwrap();
    assert_eq!(c.to_rgba8()[3], 0);
}

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: ColorDef = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, ColorDef::rgba(1.0, 0.0, 0.0, 1.0));

    let c: ColorDef = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    let c: ColorDef = "00ff00".parse().unwrap();
    assert_eq!(c.to_rgba8(), [0, 255, 0, 255]);
}

#[test]
fn parses_rgba_object_and_array() {
    let c: ColorDef = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 1.0));

    let c: ColorDef = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 0.9));
}

#[test]
fn parses_hsla_object() {
    let c: ColorDef = serde_json::from_value(json!({"h": 0.0, "s": 1.0, "l": 0.5})).unwrap();
    assert!((c.r - 1.0).abs() < 1e-9);
    assert!(c.g.abs() < 1e-9);
    assert!(c.b.abs() < 1e-9);
}

#[test]
fn rejects_unknown_names_and_bad_arrays() {
    assert!("chartreusey".parse::<ColorDef>().is_err());
    assert!("#12345".parse::<ColorDef>().is_err());
    assert!(serde_json::from_value::<ColorDef>(json!([0.1, 0.2])).is_err());
}

#[test]
fn to_rgba8_clamps_out_of_range_channels() {
    let c = ColorDef::rgba(1.5, -0.2, 0.5, 2.0);
    assert_eq!(c.to_rgba8(), [255, 0, 128, 255]);
}
