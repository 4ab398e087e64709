use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WavyteError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WavyteError::compile("x")
            .to_string()
            .contains("shader compile error:")
    );
    assert!(WavyteError::gpu("x").to_string().contains("gpu error:"));
    assert!(
        WavyteError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        WavyteError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WavyteError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
