use dupefinder::duplicates::{DuplicateFinder, FinderConfig, ScanOutcome, ScanResult};
use dupefinder::scanner::{ExtensionFilter, WalkerConfig};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scan(root: &Path, config: FinderConfig) -> ScanResult {
    DuplicateFinder::new(config)
        .find_duplicates(root)
        .unwrap()
        .into_completed()
        .expect("scan should complete")
}

fn names(result: &ScanResult) -> Vec<Vec<String>> {
    result
        .groups
        .iter()
        .map(|g| {
            g.files
                .iter()
                .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect()
}

#[test]
fn test_recursive_scan_finds_nested_copies() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"shared content");
    write(dir.path(), "sub/deeper/copy.txt", b"shared content");
    write(dir.path(), "sub/other.txt", b"different data");

    let result = scan(dir.path(), FinderConfig::default());

    assert_eq!(names(&result), vec![vec!["copy.txt", "top.txt"]]);
    assert!(result.groups[0].files.iter().all(|f| f.path.is_absolute()));
}

#[test]
fn test_non_recursive_scan_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"shared content");
    write(dir.path(), "sub/b.txt", b"shared content");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        recursive: false,
        ..Default::default()
    });
    let result = scan(dir.path(), config);

    assert!(result.is_empty());
    assert_eq!(result.summary.total_files, 1);
}

#[test]
fn test_min_size_is_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", b"abc");
    write(dir.path(), "small2", b"abc");
    write(dir.path(), "big1", b"abcdef");
    write(dir.path(), "big2", b"abcdef");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: 6,
        ..Default::default()
    });
    let result = scan(dir.path(), config);

    assert_eq!(names(&result), vec![vec!["big1", "big2"]]);
    assert_eq!(result.summary.total_files, 2);
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "photo.JPG", b"pixels");
    write(dir.path(), "copy.jpg", b"pixels");
    write(dir.path(), "notes.txt", b"pixels");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        extensions: ExtensionFilter::new([".jpg"]),
        ..Default::default()
    });
    let result = scan(dir.path(), config);

    assert_eq!(names(&result), vec![vec!["copy.jpg", "photo.JPG"]]);
}

#[test]
fn test_empty_files_are_never_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");
    write(dir.path(), "empty3", b"");

    let result = scan(dir.path(), FinderConfig::default());

    assert!(result.is_empty());
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.eliminated_by_size, 3);
    assert_eq!(result.summary.hashed_files, 0);
}

#[test]
fn test_three_way_group_wasted_space() {
    let dir = tempdir().unwrap();
    let content = vec![7u8; 20_000];
    write(dir.path(), "one.bin", &content);
    write(dir.path(), "two.bin", &content);
    write(dir.path(), "three.bin", &content);

    let result = scan(dir.path(), FinderConfig::default());

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
    assert_eq!(result.summary.duplicate_files, 2);
    assert_eq!(result.summary.wasted_space, 40_000);
}

#[test]
fn test_files_differing_after_first_chunk() {
    let dir = tempdir().unwrap();
    let mut a = vec![1u8; 64 * 1024];
    let b = a.clone();
    a[50_000] = 2;
    write(dir.path(), "a.bin", &a);
    write(dir.path(), "b.bin", &b);

    let result = scan(dir.path(), FinderConfig::default());
    assert!(result.is_empty());
    assert_eq!(result.summary.hashed_files, 2);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("x{i}.txt"), b"group x");
        write(dir.path(), &format!("nested/y{i}.txt"), b"group yy");
    }

    let finder = DuplicateFinder::with_defaults();
    let first = finder.find_duplicates(dir.path()).unwrap().into_completed().unwrap();
    let second = finder.find_duplicates(dir.path()).unwrap().into_completed().unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.summary.total_files, second.summary.total_files);
    assert_eq!(first.groups.len(), 2);
}

#[test]
fn test_group_order_is_stable_across_worker_counts() {
    let dir = tempdir().unwrap();
    for i in 0..8 {
        write(dir.path(), &format!("d{i}/a.txt"), b"aaaa");
        write(dir.path(), &format!("d{i}/b.txt"), b"bbbbb");
        write(dir.path(), &format!("d{i}/c.txt"), b"cccccc");
    }

    let sequential = scan(dir.path(), FinderConfig::default());
    for threads in [2, 3, 8] {
        let parallel = scan(dir.path(), FinderConfig::default().with_io_threads(threads));
        assert_eq!(sequential.groups, parallel.groups);
    }
}

#[test]
fn test_concurrent_scan_on_same_finder_is_rejected() {
    let dir = tempdir().unwrap();
    for i in 0..200 {
        write(dir.path(), &format!("f{i:03}.bin"), &vec![1u8; 32 * 1024]);
    }

    let finder = Arc::new(DuplicateFinder::with_defaults());
    let worker = {
        let finder = Arc::clone(&finder);
        let root = dir.path().to_path_buf();
        thread::spawn(move || finder.find_duplicates(&root))
    };

    // Wait until the first scan has claimed the finder, unless it already finished
    while !finder.is_running() && !worker.is_finished() {
        thread::yield_now();
    }
    if finder.is_running() {
        let second = finder.find_duplicates(dir.path());
        // The first scan may have finished in between
        if let Err(e) = second {
            assert!(matches!(
                e,
                dupefinder::duplicates::FinderError::AlreadyRunning
            ));
            assert!(!e.is_invalid_input());
        }
    }

    let first = worker.join().unwrap().unwrap();
    assert!(matches!(first, ScanOutcome::Completed(_)));
    assert!(!finder.is_running());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "real.txt", b"linked content");
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let result = scan(dir.path(), FinderConfig::default());

    assert!(result.is_empty());
    assert_eq!(result.summary.total_files, 1);
}
