use dupefinder::duplicates::DuplicateFinder;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn group_names(root: &std::path::Path) -> Vec<Vec<String>> {
    DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap()
        .into_completed()
        .unwrap()
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
fn test_paths_with_spaces_and_unicode() {
    let dir = tempdir().unwrap();
    for name in ["with space.txt", "ünïcödé.txt", "日本語.txt"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"content")
            .unwrap();
    }

    let groups = group_names(dir.path());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
}

#[test]
fn test_paths_with_quotes() {
    if cfg!(windows) {
        return;
    }
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file_with_\"quote\".txt"), b"content").unwrap();
    fs::write(dir.path().join("duplicate.txt"), b"content").unwrap();

    let groups = group_names(dir.path());
    assert_eq!(groups.len(), 1);
    assert!(groups[0].contains(&"file_with_\"quote\".txt".to_string()));
}

#[test]
fn test_root_with_parent_component_yields_absolute_paths() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"xyz").unwrap();
    fs::write(dir.path().join("b"), b"xyz").unwrap();

    let root = dir.path().join("sub").join("..");
    fs::create_dir(dir.path().join("sub")).unwrap();

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(&root)
        .unwrap()
        .into_completed()
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert!(result.groups[0].files.iter().all(|f| f.path.is_absolute()));
}

#[test]
fn test_deeply_nested_tree() {
    let dir = tempdir().unwrap();
    let mut deep = dir.path().to_path_buf();
    for i in 0..20 {
        deep = deep.join(format!("level{i}"));
    }
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("bottom.txt"), b"deep copy").unwrap();
    fs::write(dir.path().join("top.txt"), b"deep copy").unwrap();

    let groups = group_names(dir.path());
    assert_eq!(groups, vec![vec!["bottom.txt".to_string(), "top.txt".to_string()]]);
}
