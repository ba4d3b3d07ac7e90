use super::*;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
struct Doc {
    count: u32,
    label: String,
}

#[test]
fn write_then_read_roundtrips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    let fm = FileManager::default();
    let doc = Doc {
        count: 3,
        label: "hi".into(),
    };
    fm.write(&path, &doc).unwrap();
    let (back, _info): (Doc, FileInfo) = fm.read(&path).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn read_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.yaml");
    let fm = FileManager::default();
    let err = fm.read::<Doc>(&path).unwrap_err();
    assert!(matches!(err, FileManagerError::NotFound(_)));
}

#[test]
fn write_with_cas_detects_concurrent_writer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    let fm = FileManager::default();
    fm.write(&path, &Doc::default()).unwrap();
    let (_v, info): (Doc, FileInfo) = fm.read(&path).unwrap();

    // Simulate a racing writer touching the file after the read.
    std::thread::sleep(std::time::Duration::from_millis(10));
    fm.write(
        &path,
        &Doc {
            count: 9,
            label: "other".into(),
        },
    )
    .unwrap();

    let err = fm
        .write_with_cas(
            &path,
            &Doc {
                count: 1,
                label: "mine".into(),
            },
            &info,
        )
        .unwrap_err();
    assert!(matches!(err, FileManagerError::ConcurrentModification(_)));
}

#[test]
fn update_creates_from_default_when_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    let fm = FileManager::default();
    let result: Result<Doc, UpdateError<std::convert::Infallible>> = fm.update(&path, |d: &mut Doc| {
        d.count += 1;
        Ok(d.clone())
    });
    let doc = result.unwrap();
    assert_eq!(doc.count, 1);
}

#[test]
fn update_applies_closure_on_existing_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    let fm = FileManager::default();
    fm.write(
        &path,
        &Doc {
            count: 5,
            label: "a".into(),
        },
    )
    .unwrap();
    let result: Result<Doc, UpdateError<std::convert::Infallible>> = fm.update(&path, |d: &mut Doc| {
        d.count += 1;
        Ok(d.clone())
    });
    assert_eq!(result.unwrap().count, 6);
}

#[test]
fn delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.yaml");
    let fm = FileManager::default();
    fm.write(&path, &Doc::default()).unwrap();
    fm.delete(&path).unwrap();
    fm.delete(&path).unwrap();
    assert!(!path.exists());
}
