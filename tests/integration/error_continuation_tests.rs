use dupefinder::duplicates::{DuplicateFinder, FinderError};
use dupefinder::scanner::FileEntry;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_scan_non_existent_path() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(std::path::Path::new("/non/existent/path/12345"));

    match result {
        Err(FinderError::PathNotFound(path)) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        _ => panic!("Expected PathNotFound error, got {:?}", result),
    }
    assert!(!finder.is_running());
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("file.txt");
    File::create(&file_path).unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates(&file_path);

    match result {
        Err(FinderError::NotADirectory(path)) => {
            assert!(path.to_string_lossy().contains("file.txt"));
        }
        _ => panic!("Expected NotADirectory error, got {:?}", result),
    }
}

#[test]
fn test_unreadable_candidates_are_dropped() {
    let dir = tempdir().unwrap();
    let real1 = dir.path().join("real1.txt");
    let real2 = dir.path().join("real2.txt");
    fs::write(&real1, b"0123456789").unwrap();
    fs::write(&real2, b"0123456789").unwrap();

    let files = vec![
        FileEntry::new(PathBuf::from("nonexistent_1.txt"), 10),
        FileEntry::new(real1, 10),
        FileEntry::new(PathBuf::from("nonexistent_2.txt"), 10),
        FileEntry::new(real2, 10),
    ];
    let result = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap()
        .into_completed()
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert_eq!(result.summary.failed_hashes, 2);
    assert_eq!(result.summary.hashed_files, 2);
}

#[cfg(unix)]
#[test]
fn test_permission_denied_continues() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let sub = dir.path().join("no_access");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("hidden.txt"))
        .unwrap()
        .write_all(b"secret")
        .unwrap();

    fs::write(dir.path().join("visible1.txt"), b"public").unwrap();
    fs::write(dir.path().join("visible2.txt"), b"public").unwrap();

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();
    let still_readable = fs::read_dir(&sub).is_ok();

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .into_completed()
        .unwrap();

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    // Privileged users can read the directory anyway
    if !still_readable {
        assert!(result.summary.skipped_entries >= 1);
    }
}
