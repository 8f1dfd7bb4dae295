use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(AlignError::config("x").to_string().contains("config error:"));
    assert!(
        AlignError::connection("x")
            .to_string()
            .contains("connection error:")
    );
    assert!(
        AlignError::capture("x")
            .to_string()
            .contains("capture error:")
    );
    assert!(AlignError::not_found("x").to_string().contains("not found:"));
    assert!(
        AlignError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(
        AlignError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
    assert!(AlignError::image("x").to_string().contains("image error:"));
}

#[test]
fn only_backend_rejections_are_recoverable() {
    assert!(AlignError::backend("rejected").is_recoverable());
    assert!(!AlignError::not_found("Capture 1").is_recoverable());
    assert!(!AlignError::capture("empty").is_recoverable());
    assert!(!AlignError::connection("refused").is_recoverable());
    assert!(!AlignError::config("no password").is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AlignError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_become_protocol_errors() {
    let err: AlignError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, AlignError::Protocol(_)));
}
