use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GifError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        GifError::source_decode("x")
            .to_string()
            .contains("source decode error:")
    );
    assert!(
        GifError::encoder_misuse("x")
            .to_string()
            .contains("encoder misuse:")
    );
    assert!(
        GifError::generation("x")
            .to_string()
            .contains("generation error:")
    );
    assert!(
        GifError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GifError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
