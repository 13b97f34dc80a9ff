use super::*;
use serde_json::json;

fn def_with_font() -> SettingsDef {
    SettingsDef {
        text: TextSettingsDef {
            font_source: Some(PathBuf::from("fonts/Caption.ttf")),
            ..TextSettingsDef::default()
        },
        ..SettingsDef::default()
    }
}

#[test]
fn defaults_follow_browser_canvas_behaviour() {
    let s = Settings::resolve(&def_with_font(), 640, 480).unwrap();
    assert_eq!(s.image.width, 640);
    assert_eq!(s.image.height, 480);
    assert_eq!(s.image.padding, 30.0);
    assert_eq!(s.image.format, OutputFormat::Jpeg { quality: 92 });
    assert_eq!(s.text.font.size_px, 32.0);
    assert_eq!(s.text.color.to_rgba8(), [255, 255, 255, 255]);
}

#[test]
fn dimensions_come_from_the_source_image() {
    let img = SourceImage::from_rgba8(3, 2, vec![0u8; 3 * 2 * 4]).unwrap();
    let s = Settings::for_image(&def_with_font(), &img).unwrap();
    assert_eq!((s.image.width, s.image.height), (3, 2));
}

#[test]
fn parses_full_settings_json() {
    let def: SettingsDef = serde_json::from_value(json!({
        "text": {"font": "48px 'DejaVu Sans'", "font_source": "a.ttf", "color": "#ff000080"},
        "image": {"format": "image/png", "padding": 12.5}
    }))
    .unwrap();
    let s = Settings::resolve(&def, 100, 50).unwrap();
    assert_eq!(s.text.font.size_px, 48.0);
    assert_eq!(s.text.font.family, "DejaVu Sans");
    assert_eq!(s.text.color.to_rgba8(), [255, 0, 0, 128]);
    assert_eq!(s.image.format, OutputFormat::Png);
    assert_eq!(s.image.padding, 12.5);
}

#[test]
fn rejects_unknown_fields_and_user_dimensions() {
    let res: Result<SettingsDef, _> =
        serde_json::from_value(json!({"image": {"width": 100, "height": 100}}));
    assert!(res.is_err());
}

#[test]
fn validation_errors() {
    assert!(Settings::resolve(&SettingsDef::default(), 10, 10).is_err());
    assert!(Settings::resolve(&def_with_font(), 0, 10).is_err());

    let mut def = def_with_font();
    def.image.padding = Some(-1.0);
    assert!(Settings::resolve(&def, 10, 10).is_err());

    let mut def = def_with_font();
    def.image.format = Some("image/gif".to_owned());
    assert!(Settings::resolve(&def, 10, 10).is_err());

    let mut def = def_with_font();
    def.image.quality = Some(0);
    assert!(Settings::resolve(&def, 10, 10).is_err());

    let mut def = def_with_font();
    def.text.font = Some("Arial".to_owned());
    assert!(Settings::resolve(&def, 10, 10).is_err());
}

#[test]
fn font_descriptor_parsing() {
    let f: FontDescriptor = "32px Arial".parse().unwrap();
    assert_eq!(f, FontDescriptor { size_px: 32.0, family: "Arial".to_owned() });
    assert_eq!(f.to_string(), "32px Arial");

    let f: FontDescriptor = "  12.5px  \"Noto Sans\" ".parse().unwrap();
    assert_eq!(f.size_px, 12.5);
    assert_eq!(f.family, "Noto Sans");

    assert!("0px Arial".parse::<FontDescriptor>().is_err());
    assert!("32pt Arial".parse::<FontDescriptor>().is_err());
    assert!("32px".parse::<FontDescriptor>().is_err());
}

#[test]
fn output_format_mime_and_extension() {
    let f = OutputFormat::from_mime("IMAGE/JPEG", 80).unwrap();
    assert_eq!(f, OutputFormat::Jpeg { quality: 80 });
    assert_eq!(f.mime(), "image/jpeg");
    assert_eq!(f.extension(), "jpg");
    assert_eq!(OutputFormat::Png.mime(), "image/png");
}

#[test]
fn from_path_resolves_relative_font_source() {
    let dir = std::env::temp_dir().join(format!("signplate_settings_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    std::fs::write(&path, r#"{"text": {"font_source": "fonts/x.ttf"}}"#).unwrap();

    let def = SettingsDef::from_path(&path).unwrap();
    assert_eq!(def.text.font_source, Some(dir.join("fonts/x.ttf")));

    std::fs::remove_dir_all(&dir).ok();
}
