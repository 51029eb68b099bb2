use filetally_scan::{AnalysisConfig, FileTypeKey, SizeThreshold, Snapshot, TypeScanner};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_sized(path: &Path, size: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; size]).unwrap();
}

fn analyze(config: AnalysisConfig) -> Snapshot {
    TypeScanner::new(config).unwrap().analyze().unwrap()
}

fn assert_closed_accounting(snapshot: &Snapshot) {
    let row_bytes: u64 = snapshot.rows.iter().map(|r| r.total_bytes).sum();
    let row_count: u64 = snapshot.rows.iter().map(|r| r.count).sum();
    assert_eq!(row_bytes + snapshot.hidden_bytes, snapshot.total_bytes);
    assert_eq!(row_count, snapshot.total_files);
}

/// A tree with several types, hidden files, a `.git` blob and nesting
/// wide enough to trigger fan-out.
fn create_mixed_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    for i in 0..6 {
        for j in 0..4 {
            write_sized(&root.join(format!("pkg{i}/mod{j}/lib.rs")), 100 + i * 10 + j);
            write_sized(&root.join(format!("pkg{i}/mod{j}/notes.TXT")), 50 + j);
        }
        write_sized(&root.join(format!("pkg{i}/.env")), 7);
        write_sized(&root.join(format!("pkg{i}/Makefile")), 30);
    }
    write_sized(&root.join(".git/objects/ab/cdef"), 300);
    write_sized(&root.join(".git/HEAD"), 23);
    write_sized(&root.join("image.png"), 4096);

    temp
}

#[test]
fn test_closed_accounting() {
    let temp = create_mixed_tree();

    for show_hidden in [false, true] {
        let config = AnalysisConfig::builder()
            .root(temp.path())
            .show_hidden(show_hidden)
            .build()
            .unwrap();
        let snapshot = analyze(config);
        assert_closed_accounting(&snapshot);
    }
}

#[test]
fn test_idempotent_runs() {
    let temp = create_mixed_tree();
    let first = analyze(AnalysisConfig::new(temp.path()));
    let second = analyze(AnalysisConfig::new(temp.path()));

    assert_eq!(first.rows, second.rows);
    assert_eq!(first.total_files, second.total_files);
    assert_eq!(first.total_bytes, second.total_bytes);
    assert_eq!(first.hidden_files, second.hidden_files);
    assert_eq!(first.hidden_bytes, second.hidden_bytes);
}

#[test]
fn test_worker_count_does_not_change_results() {
    let temp = create_mixed_tree();

    let single = analyze(
        AnalysisConfig::builder()
            .root(temp.path())
            .threads(1usize)
            .build()
            .unwrap(),
    );
    let many = analyze(
        AnalysisConfig::builder()
            .root(temp.path())
            .threads(8usize)
            .build()
            .unwrap(),
    );

    assert_eq!(single.rows, many.rows);
    assert_eq!(single.total_files, many.total_files);
    assert_eq!(single.total_bytes, many.total_bytes);
    assert_eq!(single.hidden_files, many.hidden_files);
    assert_eq!(single.hidden_bytes, many.hidden_bytes);
    assert_eq!(single.total_files, 6 * 4 * 2 + 6 + 1);
}

#[test]
fn test_exclude_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("a/x.txt"), 10);
    write_sized(&root.join("b/y.txt"), 20);

    let config = AnalysisConfig::builder()
        .root(root)
        .exclude_dirs(vec![root.join("b")])
        .build()
        .unwrap();
    let snapshot = analyze(config);

    assert_eq!(snapshot.total_files, 1);
    assert_eq!(snapshot.total_bytes, 10);
    assert_eq!(snapshot.hidden_files, 0);
}

#[test]
fn test_exclude_directory_by_relative_alias() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("a/x.txt"), 10);
    write_sized(&root.join("b/y.txt"), 20);

    let config = AnalysisConfig::builder()
        .root(root)
        .exclude_dirs(vec![root.join("a").join("..").join("b")])
        .build()
        .unwrap();
    let snapshot = analyze(config);

    assert_eq!(snapshot.total_files, 1);
    assert_eq!(snapshot.total_bytes, 10);
}

#[test]
fn test_size_threshold() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("small.bin"), 500);
    write_sized(&root.join("medium.bin"), 2048);
    write_sized(&root.join("large.bin"), 5000);

    let config = AnalysisConfig::builder()
        .root(root)
        .size_threshold(SizeThreshold::new(1024, 4096).unwrap())
        .build()
        .unwrap();
    let snapshot = analyze(config);

    assert_eq!(snapshot.total_files, 1);
    assert_eq!(snapshot.total_bytes, 2048);
}

#[test]
fn test_threshold_and_type_filters_both_apply() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("big.rs"), 5000);
    write_sized(&root.join("ok.rs"), 2000);
    write_sized(&root.join("ok.md"), 2000);
    write_sized(&root.join(".hidden.rs"), 9000);

    let config = AnalysisConfig::builder()
        .root(root)
        .include_types(vec![".rs".to_string()])
        .size_threshold(SizeThreshold::new(1024, 4096).unwrap())
        .build()
        .unwrap();
    let snapshot = analyze(config);

    assert_eq!(snapshot.total_files, 1);
    assert_eq!(snapshot.rows.len(), 1);
    assert_eq!(snapshot.rows[0].key, FileTypeKey::from_filter(".rs"));
    // Out-of-range hidden files are not even counted as hidden.
    assert_eq!(snapshot.hidden_files, 0);
    assert_eq!(snapshot.total_bytes, 2000);
}

#[test]
fn test_hidden_file_accounting() {
    let temp = TempDir::new().unwrap();
    write_sized(&temp.path().join(".env"), 100);

    let hidden = analyze(AnalysisConfig::new(temp.path()));
    assert_eq!(hidden.hidden_files, 1);
    assert_eq!(hidden.hidden_bytes, 100);
    assert_eq!(hidden.total_files, 0);
    assert_eq!(hidden.total_bytes, 100);
    assert!(hidden.rows.is_empty());
    assert!(hidden.has_hidden_summary());

    let shown = analyze(
        AnalysisConfig::builder()
            .root(temp.path())
            .show_hidden(true)
            .build()
            .unwrap(),
    );
    assert_eq!(shown.hidden_files, 0);
    assert_eq!(shown.total_files, 1);
    let row = shown.row(&FileTypeKey::DotFile).unwrap();
    assert_eq!((row.count, row.total_bytes), (1, 100));
}

#[test]
fn test_vcs_directory_is_one_blob() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("project/.git/HEAD"), 100);
    write_sized(&root.join("project/.git/config"), 300);
    write_sized(&root.join("project/.git/objects/pack.idx"), 500);
    write_sized(&root.join("project/src/main.rs"), 40);

    let hidden = analyze(AnalysisConfig::new(root));
    assert_eq!(hidden.total_files, 1);
    assert_eq!(hidden.hidden_files, 1);
    assert_eq!(hidden.hidden_bytes, 900);
    assert_eq!(hidden.total_bytes, 940);
    assert!(hidden.row(&FileTypeKey::NoExtension).is_none());

    let shown = analyze(
        AnalysisConfig::builder()
            .root(root)
            .show_hidden(true)
            .build()
            .unwrap(),
    );
    let blob = shown.row(&FileTypeKey::VcsMetadata).unwrap();
    assert_eq!((blob.count, blob.total_bytes), (1, 900));
    // Files inside the blob are never classified individually.
    assert!(shown.row(&FileTypeKey::NoExtension).is_none());
    assert!(shown.row(&FileTypeKey::from_filter(".idx")).is_none());
    assert_eq!(shown.total_files, 2);
    assert_eq!(shown.total_bytes, 940);
}

#[test]
fn test_excluded_vcs_directory_contributes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join(".git/HEAD"), 100);
    write_sized(&root.join("a.txt"), 1);

    let config = AnalysisConfig::builder()
        .root(root)
        .exclude_dirs(vec![root.join(".git")])
        .build()
        .unwrap();
    let snapshot = analyze(config);

    assert_eq!(snapshot.total_bytes, 1);
    assert_eq!(snapshot.hidden_files, 0);
}

#[test]
fn test_empty_tree() {
    let temp = TempDir::new().unwrap();
    let snapshot = analyze(AnalysisConfig::new(temp.path()));
    assert_eq!(snapshot.total_files, 0);
    assert_eq!(snapshot.total_bytes, 0);
    assert!(snapshot.rows.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_counted_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("real/data.csv"), 64);
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

    for threads in [1usize, 4] {
        let config = AnalysisConfig::builder()
            .root(root)
            .threads(threads)
            .build()
            .unwrap();
        let snapshot = analyze(config);
        assert_eq!(snapshot.total_files, 1, "threads = {threads}");
        assert_eq!(snapshot.total_bytes, 64);
    }
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_terminates() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("loop/file.txt"), 5);
    std::os::unix::fs::symlink(root, root.join("loop/back")).unwrap();

    let snapshot = analyze(AnalysisConfig::new(root));
    assert_eq!(snapshot.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_no_follow_skips_symlinks() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("target.txt"), 8);
    std::os::unix::fs::symlink(root.join("target.txt"), root.join("link.txt")).unwrap();

    let followed = analyze(AnalysisConfig::new(root));
    // Both names resolve to a regular file; file identities are not deduped.
    assert_eq!(followed.total_files, 2);

    let config = AnalysisConfig::builder()
        .root(root)
        .follow_symlinks(false)
        .build()
        .unwrap();
    let unfollowed = analyze(config);
    assert_eq!(unfollowed.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_is_a_warning() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("ok.txt"), 3);
    std::os::unix::fs::symlink(root.join("missing.txt"), root.join("dangling.txt")).unwrap();

    let snapshot = analyze(AnalysisConfig::new(root));
    assert_eq!(snapshot.total_files, 1);
    assert_eq!(snapshot.warnings.len(), 1);
    assert_eq!(snapshot.warnings[0].kind, filetally_scan::WarningKind::BrokenSymlink);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("top.txt"), 10);
    write_sized(&root.join("open/inner.rs"), 20);
    write_sized(&root.join("locked/secret.txt"), 99);

    let locked = root.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Permission bits do not stop a privileged user.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    for threads in [1usize, 4] {
        let config = AnalysisConfig::builder()
            .root(root)
            .threads(threads)
            .build()
            .unwrap();
        let snapshot = analyze(config);

        assert_eq!(snapshot.total_files, 2, "threads = {threads}");
        assert_eq!(snapshot.total_bytes, 30);
        assert!(
            snapshot
                .warnings
                .iter()
                .any(|w| w.kind == filetally_scan::WarningKind::PermissionDenied
                    && w.path.ends_with("locked"))
        );
    }

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}
