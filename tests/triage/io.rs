use crashsort::io::error::IoError;
use crashsort::io::sandbox::resolve;
use crashsort::io::{read_text, Available, BoundedReader};
use std::io::{Cursor, Read};
use tempfile::TempDir;

#[test]
fn reads_everything_up_to_the_limit() {
    for (len, limit) in [(0usize, 4u64), (3, 4), (4, 4)] {
        let data = vec![b'x'; len];
        let mut reader = BoundedReader::new(Cursor::new(data.clone()), limit);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(reader.bytes_read(), len as u64);
    }
}

#[test]
fn over_limit_yields_exactly_limit_bytes_then_fails() {
    let mut reader = BoundedReader::new(Cursor::new(vec![b'x'; 10]), 4);
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).unwrap();
    let err = reader.read(&mut buf).unwrap_err();
    assert!(IoError::from(err).is_limit_exceeded());
    assert!(reader.read(&mut buf).is_err());
}

#[test]
fn available_never_exceeds_remaining_budget() {
    let mut reader = BoundedReader::new(Cursor::new(vec![b'x'; 10]), 6);
    assert_eq!(reader.available(), 6);
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(reader.available(), 2);
}

#[test]
fn read_text_rejects_oversized_input() {
    let err = read_text(Cursor::new(vec![b'a'; 32]), 16).unwrap_err();
    assert!(err.to_string().contains("16"));
    assert_eq!(read_text(Cursor::new("ok"), 16).unwrap(), "ok");
}

#[test]
fn resolver_contains_candidates() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().canonicalize().unwrap();
    assert_eq!(resolve(dir.path(), "a.txt"), Some(base.join("a.txt")));
    for escape in ["../a.txt", "/tmp/a.txt", "x/../../a.txt", ""] {
        assert!(resolve(dir.path(), escape).is_none(), "{} escaped", escape);
    }
}
