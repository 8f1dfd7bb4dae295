use std::path::PathBuf;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_reference").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn missing_reference_is_config_error() {
    let err = ReferenceStore::load(Path::new("target/definitely/missing.png")).unwrap_err();
    assert!(matches!(err, AlignError::Config(_)));
}

#[test]
fn undecodable_reference_is_config_error() {
    let path = scratch_dir("garbage").join("ref.png");
    std::fs::write(&path, b"this is not a png").unwrap();
    let err = ReferenceStore::load(&path).unwrap_err();
    assert!(matches!(err, AlignError::Config(_)));
}

#[test]
fn load_keeps_pixels_and_source_path() {
    let path = scratch_dir("ok").join("ref.png");
    let img = RasterImage::solid(12, 9, [128, 128, 128]).unwrap();
    img.save_png(&path).unwrap();

    let store = ReferenceStore::load(&path).unwrap();
    assert_eq!(store.image(), &img);
    assert_eq!(store.source(), Some(path.as_path()));

    let cloned = store.clone();
    assert!(std::ptr::eq(cloned.image(), store.image()));
}
