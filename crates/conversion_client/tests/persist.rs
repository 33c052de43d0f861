use std::fs;

use conversion_client::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("abc.mp3", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "abc.mp3");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("abc.mp3", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("abc.mp3", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("abc.mp3").exists());
}

#[test]
fn rejects_path_like_names() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    for name in ["", "..", "../escape.mp3", "a\\b.mp3"] {
        assert!(matches!(
            writer.write(name, b"data"),
            Err(PersistError::InvalidFileName(_))
        ));
    }
}
