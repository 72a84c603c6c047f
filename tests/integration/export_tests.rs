use dupefinder::duplicates::{DuplicateFinder, KeepPolicy, ScanResult};
use dupefinder::output::{export_to_file, JsonOutput, TextOutput};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn scan(root: &Path) -> ScanResult {
    DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap()
        .into_completed()
        .unwrap()
}

fn populate(root: &Path) {
    for (name, secs) in [("b.txt", 2_000), ("a.txt", 3_000), ("c.txt", 1_000)] {
        let path = root.join(name);
        fs::write(&path, b"exported duplicate").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).unwrap();
    }
    fs::write(root.join("unique.txt"), b"nothing like it").unwrap();
}

#[test]
fn test_json_export_structure() {
    let scan_dir = tempdir().unwrap();
    populate(scan_dir.path());
    let result = scan(scan_dir.path());

    let out_dir = tempdir().unwrap();
    let path = out_dir.path().join("results.json");
    export_to_file(&result, &path, None).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let groups = parsed["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["size"].as_u64(), Some(18));
    assert_eq!(groups[0]["wasted_space"].as_u64(), Some(36));
    assert_eq!(groups[0]["hash"].as_str().unwrap().len(), 64);

    let files = groups[0]["files"].as_array().unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f["path"].as_str().unwrap()).collect();
    assert!(paths[0].ends_with("a.txt"));
    assert!(paths[2].ends_with("c.txt"));
    assert!(files.iter().all(|f| f["modified"].is_string()));

    let stats = &parsed["statistics"];
    assert_eq!(stats["total_groups"].as_u64(), Some(1));
    assert_eq!(stats["total_duplicates"].as_u64(), Some(2));
    assert_eq!(stats["wasted_space_bytes"].as_u64(), Some(36));
    assert_eq!(stats["files_scanned"].as_u64(), Some(4));
}

#[test]
fn test_json_export_with_keep_newest() {
    let scan_dir = tempdir().unwrap();
    populate(scan_dir.path());
    let result = scan(scan_dir.path());

    let output = JsonOutput::with_keep_policy(&result, KeepPolicy::Newest);
    let keepers: Vec<&str> = output.duplicates[0]
        .files
        .iter()
        .filter(|f| f.keep == Some(true))
        .map(|f| f.path.as_str())
        .collect();

    assert_eq!(keepers.len(), 1);
    assert!(keepers[0].ends_with("a.txt"));
}

#[test]
fn test_text_export_report() {
    let scan_dir = tempdir().unwrap();
    populate(scan_dir.path());
    let result = scan(scan_dir.path());

    let out_dir = tempdir().unwrap();
    let path = out_dir.path().join("results.txt");
    export_to_file(&result, &path, Some(KeepPolicy::Oldest)).unwrap();

    let report = fs::read_to_string(&path).unwrap();
    assert!(report.starts_with("Duplicate File Finder Results\n"));
    assert!(report.contains("Group 1 (Hash: "));
    assert!(report.contains("File size: 18.00 B\n"));
    assert!(report.contains("Copies: 3\n"));
    assert!(report
        .lines()
        .any(|l| l.starts_with("Keep (oldest): ") && l.ends_with("c.txt")));
    assert!(report.contains("Total duplicates: 2\n"));
    assert!(report.ends_with("Wasted space: 36.00 B\n"));
}

#[test]
fn test_text_report_matches_export() {
    let scan_dir = tempdir().unwrap();
    populate(scan_dir.path());
    let result = scan(scan_dir.path());

    let out_dir = tempdir().unwrap();
    let path = out_dir.path().join("report");
    export_to_file(&result, &path, None).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        TextOutput::new(&result).to_string_report()
    );
}
