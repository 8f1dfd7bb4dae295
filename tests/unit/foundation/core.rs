use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 1080).is_err());
    assert!(Canvas::new(1920, 0).is_err());
    let c = Canvas::new(1920, 1080).unwrap();
    assert_eq!(c.midpoint(), Point::new(960.0, 540.0));
}

#[test]
fn centered_transform_is_canonical() {
    let t = Transform::centered(Canvas::new(1920, 1080).unwrap());
    assert_eq!(t.position(), Point::new(960.0, 540.0));
    assert_eq!(t.scale(), Vec2::new(1.0, 1.0));
    assert_eq!(t.rotation, 0.0);
    assert_eq!(t.alignment, Alignment::CENTER);
    assert_eq!(
        (t.crop_left, t.crop_right, t.crop_top, t.crop_bottom),
        (0, 0, 0, 0)
    );
}

#[test]
fn transform_uses_camel_case_keys() {
    let t = Transform::centered(Canvas::new(100, 50).unwrap());
    let v = serde_json::to_value(t).unwrap();
    assert_eq!(v["positionX"], 50.0);
    assert_eq!(v["positionY"], 25.0);
    assert_eq!(v["scaleX"], 1.0);
    assert_eq!(v["cropBottom"], 0);
    assert_eq!(v["alignment"], 0);
    assert!(v.get("boundsType").is_none());
}

#[test]
fn transform_ignores_extra_backend_fields() {
    let json = r#"{
        "positionX": 10.5, "positionY": 20.0, "rotation": 0.0,
        "scaleX": 0.5, "scaleY": 0.75,
        "cropLeft": 1, "cropRight": 2, "cropTop": 3, "cropBottom": 4,
        "alignment": 5, "boundsType": "OBS_BOUNDS_NONE",
        "sourceWidth": 1920.0, "sourceHeight": 1080.0, "width": 960.0, "height": 810.0
    }"#;
    let t: Transform = serde_json::from_str(json).unwrap();
    assert_eq!(t.position(), Point::new(10.5, 20.0));
    assert_eq!(t.scale(), Vec2::new(0.5, 0.75));
    assert_eq!(t.crop_bottom, 4);
    assert_eq!(t.alignment, Alignment::TOP_LEFT);
    assert!(t.alignment.contains(Alignment::LEFT));
    assert!(!t.alignment.contains(Alignment::BOTTOM));
}
