//! Integration tests for loading presets from disk.

use excite_script::{write_file, Error, Loader, PresetDef};
use std::fs;

#[test]
fn test_load_directory_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.ron"), r#"(name: "second")"#).unwrap();
    fs::write(
        dir.path().join("a.ron"),
        r#"(presets: [(name: "first"), (name: "also_first")])"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a preset").unwrap();

    let nested = dir.path().join("more");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("c.ron"), r#"(name: "nested")"#).unwrap();

    let mut loader = Loader::new();
    loader.load_directory(dir.path()).unwrap();
    let defs = loader.finish();

    assert_eq!(
        defs.names().collect::<Vec<_>>(),
        vec!["first", "also_first", "second", "nested"]
    );
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = Loader::new();
    assert!(matches!(
        loader.load_directory(dir.path().join("absent")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_written_preset_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.ron");

    let mut loader = Loader::new();
    loader
        .load_str(
            r#"(
                name: "saved",
                playing: true,
                events: [(threshold: 120.0, weight: Some(0.4), action: "pulse")],
                climax: "peak",
            )"#,
        )
        .unwrap();
    let preset: PresetDef = loader.defs().get("saved").unwrap().clone();

    write_file(&path, &preset).unwrap();

    let mut reloaded = Loader::new();
    reloaded.load_file(&path).unwrap();
    assert_eq!(reloaded.defs().get("saved"), Some(&preset));
}

#[test]
fn test_duplicate_across_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.ron"), r#"(name: "dup")"#).unwrap();
    fs::write(dir.path().join("two.ron"), r#"(name: "dup")"#).unwrap();

    let mut loader = Loader::new();
    assert!(matches!(
        loader.load_directory(dir.path()),
        Err(Error::DuplicatePreset(_))
    ));
}

#[test]
fn test_failed_directory_keeps_earlier_presets_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.ron"), r#"(name: "alpha")"#).unwrap();
    fs::write(dir.path().join("b.ron"), r#"(name: "beta", events: [(threshold: 1.0)"#).unwrap();

    let mut loader = Loader::new();
    loader.load_str(r#"(name: "earlier")"#).unwrap();
    assert!(matches!(loader.load_directory(dir.path()), Err(Error::Ron(_))));
    assert_eq!(loader.defs().names().collect::<Vec<_>>(), vec!["earlier"]);
}
