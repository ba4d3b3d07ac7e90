use super::*;
use tempfile::tempdir;

#[test]
fn write_then_read_roundtrips() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    surface.write_file(Path::new("notes.md"), b"hello").unwrap();
    let back = surface.read_file(Path::new("notes.md")).unwrap();
    assert_eq!(back, b"hello");
}

#[test]
fn parent_dir_traversal_is_rejected() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    let err = surface.read_file(Path::new("../secret")).unwrap_err();
    assert!(matches!(err, StorageSurfaceError::PathTraversal(_)));
}

#[test]
fn absolute_path_is_rejected() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    let err = surface.write_file(Path::new("/etc/passwd"), b"x").unwrap_err();
    assert!(matches!(err, StorageSurfaceError::PathTraversal(_)));
}

#[test]
fn nested_parent_traversal_inside_path_is_rejected() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    let err = surface.read_file(Path::new("sub/../../escape")).unwrap_err();
    assert!(matches!(err, StorageSurfaceError::PathTraversal(_)));
}

#[test]
fn read_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    let err = surface.read_file(Path::new("nope.txt")).unwrap_err();
    assert!(matches!(err, StorageSurfaceError::NotFound(_)));
}

#[test]
fn list_files_recurses_and_reports_relative_paths() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    surface.write_file(Path::new("a.txt"), b"1").unwrap();
    surface.write_file(Path::new("sub/b.txt"), b"22").unwrap();

    let mut entries = surface.list_files(Path::new(".")).unwrap();
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].relative_path, Path::new("a.txt"));
    assert_eq!(entries[1].relative_path, Path::new("sub/b.txt"));
    assert_eq!(entries[1].size, 2);
}

#[test]
fn remove_is_idempotent_for_missing_paths() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    surface.remove(Path::new("nope.txt")).unwrap();
}

#[test]
fn remove_deletes_directories_recursively() {
    let dir = tempdir().unwrap();
    let surface = StorageSurface::new(dir.path());
    surface.write_file(Path::new("sub/b.txt"), b"22").unwrap();
    surface.remove(Path::new("sub")).unwrap();
    assert!(!dir.path().join("sub").exists());
}
