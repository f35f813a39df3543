use std::fs;
use std::path::Path;

use tempfile::tempdir;

use nabor::{NaborError, PatternLibrary};

#[test]
fn test_round_trip_preserves_patterns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("patterns.json");

    let mut library = PatternLibrary::new();
    library
        .add("fcc_bulk", "12(4,2,1)", "FCC Bulk", "0b3d05")
        .unwrap();
    library
        .add("hcp_bulk", "6(4,2,1)6(4,2,2)", "HCP Bulk", "911eb4")
        .unwrap();
    library.save(&path).unwrap();

    let reloaded = PatternLibrary::load(&path).unwrap();
    assert_eq!(reloaded.len(), library.len());
    for pattern in library.patterns() {
        let other = reloaded.get_by_key(&pattern.key).unwrap();
        assert_eq!(other, pattern);
    }
}

#[test]
fn test_create_edit_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("patterns.json");

    let mut library = PatternLibrary::new();
    library
        .add("fcc_bulk", "12(4,2,1)", "FCC Bulk", "0b3d05")
        .unwrap();
    library
        .edit("fcc_bulk", "12(4,2,2)", "FCC BULK", "0b3d08")
        .unwrap();
    library.save(&path).unwrap();

    let reloaded = PatternLibrary::load(&path).unwrap();
    let by_key = reloaded.get_by_key("fcc_bulk").unwrap();
    assert_eq!(by_key.fingerprint, "12(4,2,2)");
    assert_eq!(by_key.label, "FCC BULK");
    assert_eq!(by_key.color, "0b3d08");

    let by_fingerprint = reloaded.get("12(4,2,2)").unwrap();
    assert_eq!(by_fingerprint.key, "fcc_bulk");
    // the old fingerprint no longer resolves
    assert_eq!(reloaded.get("12(4,2,1)").unwrap().key, "unknown");
}

#[test]
fn test_invalid_inputs_rejected() {
    let mut library = PatternLibrary::new();

    assert!(matches!(
        library.add("bad key", "12(4,2,1)", "Label", "0b3d05"),
        Err(NaborError::InvalidInput(_))
    ));
    assert!(matches!(
        library.add("key", "invalid", "Label", "0b3d05"),
        Err(NaborError::InvalidInput(_))
    ));
    assert!(matches!(
        library.add("key", "12(4,2,1)", "Label", "0b3d0g"),
        Err(NaborError::InvalidInput(_))
    ));
    assert!(matches!(
        library.edit("absent", "12(4,2,1)", "Label", "0b3d05"),
        Err(NaborError::NotFound(_))
    ));
    assert!(matches!(
        library.remove("absent"),
        Err(NaborError::NotFound(_))
    ));
}

#[test]
fn test_library_fixture_loads() {
    let library = PatternLibrary::load(Path::new("tests/assets/patterns.json")).unwrap();
    assert_eq!(library.len(), 3);
    assert_eq!(library.identify("12(4,2,1)").unwrap(), "FCC Bulk");
    assert_eq!(library.identify("").unwrap(), "Unknown");
}

#[test]
fn test_missing_unknown_entry_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("patterns.json");
    fs::write(
        &path,
        r#"{"patterns": {"fcc_bulk": {"label": "FCC Bulk", "fingerprint": "12(4,2,1)", "color": "0b3d05"}}}"#,
    )
    .unwrap();

    assert!(matches!(
        PatternLibrary::load(&path),
        Err(NaborError::InvalidInput(_))
    ));
}

#[test]
fn test_malformed_json_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("patterns.json");
    fs::write(&path, "{not json").unwrap();

    assert!(matches!(
        PatternLibrary::load(&path),
        Err(NaborError::InvalidInput(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        PatternLibrary::load(Path::new("tests/assets/does_not_exist.json")),
        Err(NaborError::Io(_))
    ));
}
