use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(BurninError::open("x").to_string().contains("open error:"));
    assert!(BurninError::no_frames("x").to_string().contains("no frames:"));
    assert!(
        BurninError::unreadable_frame("x")
            .to_string()
            .contains("unreadable frame:")
    );
    assert!(
        BurninError::unsupported_format("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(
        BurninError::unknown_video("x")
            .to_string()
            .contains("unknown video:")
    );
    assert!(
        BurninError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BurninError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BurninError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
