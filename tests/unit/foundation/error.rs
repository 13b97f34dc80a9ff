use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SignplateError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SignplateError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        SignplateError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        SignplateError::encode("x")
            .to_string()
            .contains("encode error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SignplateError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
