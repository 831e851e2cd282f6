use morphline::{ColorSpace, EngineConfig, MapperStrategy, ShapeKind, ShapeState};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "frame_rate": 24,
            "vertex_resolution": 32,
            "defaults": {{
                "mapper": {{ "strategy": "clustering", "seed": 3 }},
                "color_space": "rgb",
                "step_threshold": 0.25
            }}
        }}"#
    )
    .unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.frame_rate, 24.0);
    assert_eq!(config.vertex_resolution, 32);
    assert_eq!(config.defaults.color_space, ColorSpace::Rgb);
    assert!(matches!(
        config.defaults.mapper,
        MapperStrategy::Clustering { seed: 3, .. }
    ));
    assert_eq!(config.defaults.step_threshold, 0.25);
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn test_loaded_defaults_reach_elements() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "defaults": {{ "field_easing": {{ "opacity": "hold" }} }} }}"#
    )
    .unwrap();
    let config = EngineConfig::load(file.path()).unwrap();

    let square = ShapeState::new(ShapeKind::Rectangle {
        width: 2.0,
        height: 2.0,
        corner_radius: 0.0,
    });
    let element = config
        .element()
        .keystate(0.0, square.clone())
        .keystate(1.0, square.with_opacity(0.0))
        .build()
        .unwrap();
    // The configured field easing holds opacity until the end.
    assert_eq!(element.resolve(0.95).unwrap().opacity, 1.0);
    assert_eq!(element.resolve(1.0).unwrap().opacity, 0.0);
}
