//! Directory batch get.

mod support;

use pretty_assertions::assert_eq;
use s3bin_core::{BatchSummary, ErrorKind, MemoryStore, StorageKey, SyncEngine};
use std::fs;
use std::path::Path;

/// Puts each file, then deletes it so only its pointer is left.
fn publish(engine: &SyncEngine<MemoryStore>, root: &Path, files: &[(&str, &[u8])]) {
    for (name, content) in files {
        let path = support::write_file(root, name, content);
        engine.put(&path).unwrap();
        fs::remove_file(&path).unwrap();
    }
}

#[test]
fn resolves_every_pointer_and_skips_other_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let engine = support::memory_engine();
    publish(
        &engine,
        root,
        &[
            ("a.bin", b"alpha"),
            ("nested/b.bin", b"bravo"),
            ("nested/deeper/c.bin", b"charlie"),
        ],
    );
    support::write_file(root, "README.md", b"docs");
    support::write_file(root, "nested/notes.txt", b"notes");

    let summary = engine.get_dir(root).unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            up_to_date: 0,
            updated: 0,
            downloaded: 3,
        }
    );
    assert_eq!(summary.total(), 3);
    assert_eq!(engine.store().get_count(), 3);
    assert_eq!(fs::read(root.join("a.bin")).unwrap(), b"alpha");
    assert_eq!(fs::read(root.join("nested/b.bin")).unwrap(), b"bravo");
    assert_eq!(fs::read(root.join("nested/deeper/c.bin")).unwrap(), b"charlie");
    assert_eq!(fs::read(root.join("README.md")).unwrap(), b"docs");
}

#[test]
fn second_run_is_all_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();
    publish(&engine, dir.path(), &[("x.bin", b"x"), ("sub/y.bin", b"y")]);

    engine.get_dir(dir.path()).unwrap();
    let again = engine.get_dir(dir.path()).unwrap();

    assert_eq!(again.up_to_date, 2);
    assert_eq!(again.total(), 2);
    assert_eq!(engine.store().get_count(), 2);
}

#[test]
fn mixed_outcomes_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let engine = support::memory_engine();
    publish(&engine, root, &[("fresh.bin", b"fresh"), ("stale.bin", b"stale")]);
    let kept = support::write_file(root, "kept.bin", b"kept");
    engine.put(&kept).unwrap();
    support::write_file(root, "stale.bin", b"drifted");

    let summary = engine.get_dir(root).unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            up_to_date: 1,
            updated: 1,
            downloaded: 1,
        }
    );
}

#[test]
fn first_failure_stops_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let engine = support::memory_engine();
    publish(
        &engine,
        root,
        &[
            ("1.bin", b"one"),
            ("2.bin", b"two"),
            ("3.bin", b"three"),
            ("4.bin", b"four"),
            ("5.bin", b"five"),
        ],
    );
    let third = StorageKey::from(&s3bin_core::Digest::of(b"three"));
    engine.store().remove(third.as_str()).unwrap();

    let err = engine.get_dir(root).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(err.to_string().contains("3.bin.sha1"), "got: {err}");
    assert_eq!(engine.store().get_count(), 3);
    assert!(root.join("1.bin").exists());
    assert!(root.join("2.bin").exists());
    assert!(!root.join("3.bin").exists());
    assert!(!root.join("4.bin").exists());
    assert!(!root.join("5.bin").exists());
}

#[test]
fn files_resolve_before_subdirectories_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let engine = support::memory_engine();
    publish(
        &engine,
        root,
        &[
            ("a/1.bin", b"a1"),
            ("b/1.bin", b"b1"),
            ("z.bin", b"z"),
        ],
    );
    // "a/1.bin" fails: "z.bin" at the top level must already be done,
    // "b/1.bin" in a later directory must not be
    let failing = StorageKey::from(&s3bin_core::Digest::of(b"a1"));
    engine.store().remove(failing.as_str()).unwrap();

    engine.get_dir(root).unwrap_err();

    assert!(root.join("z.bin").exists());
    assert!(!root.join("b/1.bin").exists());
}

#[test]
fn malformed_pointer_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    support::write_file(dir.path(), "bad.bin.sha1", b"not a digest");
    let engine = support::memory_engine();

    let err = engine.get_dir(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn empty_directory_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();

    assert_eq!(engine.get_dir(dir.path()).unwrap(), BatchSummary::default());
    assert_eq!(engine.store().get_count(), 0);
}

#[test]
fn missing_root_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();

    let err = engine.get_dir(&dir.path().join("absent")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Read);
    assert!(err.to_string().starts_with("get-dir "), "got: {err}");
}

#[test]
fn bare_suffix_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    support::write_file(dir.path(), ".sha1", b"junk");
    let engine = support::memory_engine();

    assert_eq!(engine.get_dir(dir.path()).unwrap().total(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_pointer_names_are_resolved() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();
    let app = dir.path().join(OsStr::from_bytes(b"app\xff.bin"));
    fs::write(&app, b"HELLO").unwrap();
    engine.put(&app).unwrap();
    fs::remove_file(&app).unwrap();

    let summary = engine.get_dir(dir.path()).unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(fs::read(&app).unwrap(), b"HELLO");
}

#[test]
fn deep_trees_do_not_recurse() {
    let dir = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();
    let deep: String = (0..64).map(|i| format!("d{i}/")).collect();
    publish(&engine, dir.path(), &[(&format!("{deep}leaf.bin"), b"leaf")]);

    let summary = engine.get_dir(dir.path()).unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(fs::read(dir.path().join(format!("{deep}leaf.bin"))).unwrap(), b"leaf");
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let outside = tempfile::tempdir().unwrap();
    let engine = support::memory_engine();
    publish(&engine, outside.path(), &[("far.bin", b"far")]);

    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    assert_eq!(engine.get_dir(dir.path()).unwrap().total(), 0);
    assert!(!outside.path().join("far.bin").exists());
}
