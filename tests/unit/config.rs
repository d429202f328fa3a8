use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = PipelineConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, PipelineConfig::default());
    assert_eq!(cfg.frame_format, FrameFormat::Jpg);
    assert_eq!(cfg.jpeg_quality, 95);
    assert_eq!(cfg.default_fps().unwrap(), Fps { num: 30, den: 1 });
    cfg.validate().unwrap();
}

#[test]
fn partial_document_overrides_fields() {
    let cfg = PipelineConfig::from_json_str(
        r#"{"data_dir": "/srv/burnin", "frame_format": "png", "style": {"panel_opacity": 0.5}}"#,
    )
    .unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/burnin"));
    assert_eq!(cfg.frame_format, FrameFormat::Png);
    assert_eq!(cfg.style.panel_opacity, 0.5);
    assert_eq!(cfg.style.base_font_px, 28.0);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = PipelineConfig::from_json_str(r#"{"dataDir": "x"}"#).unwrap_err();
    assert!(matches!(err, BurninError::Serde(_)));
}

#[test]
fn layout_paths_derive_from_data_dir() {
    let cfg = PipelineConfig::with_data_dir("/d");
    assert_eq!(cfg.uploads_dir(), PathBuf::from("/d/uploads"));
    assert_eq!(cfg.frames_dir(), PathBuf::from("/d/frames"));
    assert_eq!(
        cfg.caption_store_path(),
        PathBuf::from("/d/uploads/captions.json")
    );

    let mut abs = cfg.clone();
    abs.caption_store = PathBuf::from("/elsewhere/c.json");
    assert_eq!(abs.caption_store_path(), PathBuf::from("/elsewhere/c.json"));
}

#[test]
fn env_overrides_apply_and_ignore_blanks() {
    let mut cfg = PipelineConfig::default();
    cfg.apply_env_from(|key| match key {
        ENV_DATA_DIR => Some("/from/env".to_string()),
        ENV_FONT => Some("  ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.data_dir, PathBuf::from("/from/env"));
    assert_eq!(cfg.font_path, None);

    cfg.apply_env_from(|key| (key == ENV_FONT).then(|| "/f.ttf".to_string()));
    assert_eq!(cfg.font_path, Some(PathBuf::from("/f.ttf")));
    assert_eq!(cfg.data_dir, PathBuf::from("/from/env"));
}

#[test]
fn validate_catches_bad_values() {
    let mut cfg = PipelineConfig::default();
    cfg.default_fps = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.style.panel_opacity = 1.5;
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.jpeg_quality = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn ensure_dirs_creates_layout() {
    let root = std::env::temp_dir().join(format!(
        "burnin_config_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let cfg = PipelineConfig::with_data_dir(&root);
    cfg.ensure_dirs().unwrap();
    assert!(cfg.uploads_dir().is_dir());
    assert!(cfg.frames_dir().is_dir());
}
