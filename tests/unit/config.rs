use super::*;

fn sample() -> RunConfig {
    let mut cfg = RunConfig::new(
        vec!["Capture 1".to_string(), "Capture 2".to_string()],
        "reference.png",
    );
    cfg.connection.password = Some("secret".to_string());
    cfg
}

#[test]
fn defaults_match_documented_values() {
    let cfg = RunConfig::new(vec!["a".to_string()], "r.png");
    assert_eq!(cfg.scene, "DJing");
    assert_eq!(cfg.max_iterations, 20);
    assert_eq!(cfg.similarity_threshold, 0.99);
    assert_eq!(cfg.adjustment_step, 5.0);
    assert_eq!(cfg.diff_threshold, 50);
    assert_eq!(cfg.settle_delay(), Duration::from_millis(500));
    assert_eq!(cfg.connection.url(), "ws://localhost:4455");
    assert_eq!(cfg.capture_source(), "DJing");
}

#[test]
fn json_fills_defaults_for_omitted_tunables() {
    let cfg: RunConfig = serde_json::from_str(
        r#"{"sources": ["Capture 1"], "reference": "ref.png", "max_iterations": 3}"#,
    )
    .unwrap();
    assert_eq!(cfg.max_iterations, 3);
    assert_eq!(cfg.similarity_threshold, 0.99);
    assert_eq!(cfg.connection.port, 4455);
    assert!(cfg.connection.password.is_none());
}

#[test]
fn validate_rejects_bad_values() {
    assert!(sample().validate().is_ok());

    let mut c = sample();
    c.sources.clear();
    assert!(matches!(c.validate(), Err(AlignError::Config(_))));

    let mut c = sample();
    c.sources.push("Capture 1".to_string());
    assert!(c.validate().is_err());

    let mut c = sample();
    c.max_iterations = 0;
    assert!(c.validate().is_err());

    let mut c = sample();
    c.similarity_threshold = 1.5;
    assert!(c.validate().is_err());

    let mut c = sample();
    c.adjustment_step = f64::NAN;
    assert!(c.validate().is_err());
}

#[test]
fn missing_password_is_config_error() {
    let mut conn = ConnectionConfig::default();
    assert!(matches!(conn.validate(), Err(AlignError::Config(_))));

    conn.fill_password(Some(String::new()));
    assert!(conn.validate().is_err());

    conn.fill_password(Some("pw".to_string()));
    assert!(conn.validate().is_ok());

    conn.fill_password(Some("other".to_string()));
    assert_eq!(conn.password.as_deref(), Some("pw"));
}

#[test]
fn debug_output_redacts_password() {
    let conn = sample().connection;
    let dbg = format!("{conn:?}");
    assert!(!dbg.contains("secret"));
    assert!(dbg.contains("<redacted>"));
}

#[test]
fn from_path_resolves_relative_paths() {
    let dir = PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("run.json");
    std::fs::write(
        &path,
        r#"{"sources": ["Capture 1"], "reference": "ref.png", "dump_dir": "frames"}"#,
    )
    .unwrap();

    let cfg = RunConfig::from_path(&path).unwrap();
    assert_eq!(cfg.reference, dir.join("ref.png"));
    assert_eq!(cfg.dump_dir, Some(dir.join("frames")));
}

#[test]
fn unreadable_config_is_config_error() {
    let err = RunConfig::from_path(Path::new("target/nope/run.json")).unwrap_err();
    assert!(matches!(err, AlignError::Config(_)));
}
