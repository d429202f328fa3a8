use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap().as_f64(), 30.0);
}

#[test]
fn fps_parses_ffprobe_ratios() {
    assert_eq!(Fps::parse_ratio("30/1"), Some(Fps { num: 30, den: 1 }));
    assert_eq!(
        Fps::parse_ratio("30000/1001"),
        Some(Fps {
            num: 30000,
            den: 1001
        })
    );
    assert_eq!(Fps::parse_ratio("25"), Some(Fps { num: 25, den: 1 }));
    assert_eq!(Fps::parse_ratio("0/0"), None);
    assert_eq!(Fps::parse_ratio("abc"), None);
    assert_eq!(Fps::new(24, 1).unwrap().to_string(), "24/1");
}

#[test]
fn video_id_from_path_uses_stem() {
    let id = VideoId::from_path(std::path::Path::new("/tmp/uploads/upload_ab12.mp4")).unwrap();
    assert_eq!(id.as_str(), "upload_ab12");
}

#[test]
fn video_id_rejects_path_like_values() {
    assert!(VideoId::new("").is_err());
    assert!(VideoId::new("   ").is_err());
    assert!(VideoId::new("..").is_err());
    assert!(VideoId::new("a/b").is_err());
    assert!(VideoId::new("a\\b").is_err());
    assert!(VideoId::new("clip_01").is_ok());
}

#[test]
fn video_id_serializes_as_plain_string() {
    let id = VideoId::new("clip").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"clip\"");
}
