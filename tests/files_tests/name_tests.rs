//! Tests for name validation and path resolution

use txtserve::files::is_valid_name;
use txtserve::{Share, TxtError};

#[test]
fn test_accepts_simple_names() {
    for name in ["notes.txt", "a", "with space.md", "ünïcødé.txt", ".hidden", "a.b.c", "tab\there"] {
        assert!(is_valid_name(name), "rejected {:?}", name);
    }
}

#[test]
fn test_rejects_empty() {
    assert!(!is_valid_name(""));
}

#[test]
fn test_rejects_separators() {
    for name in ["/etc/passwd", "a/b", "dir/", "a\\b", "\\windows"] {
        assert!(!is_valid_name(name), "accepted {:?}", name);
    }
}

#[test]
fn test_rejects_dot_dot_anywhere() {
    for name in ["..", "../x", "x/../y", "a..b", "trailing..", "..leading"] {
        assert!(!is_valid_name(name), "accepted {:?}", name);
    }
}

#[test]
fn test_resolve_rejects_without_touching_disk() {
    // The root does not exist; rejection must still be "bad name"
    let share = Share::new("/definitely/not/a/real/root");
    assert!(matches!(share.resolve("../etc/passwd"), Err(TxtError::BadName)));
    assert!(matches!(share.resolve(""), Err(TxtError::BadName)));
}

#[test]
fn test_resolve_joins_root() {
    let share = Share::new("/srv/files");
    let path = share.resolve("notes.txt").unwrap();
    assert_eq!(path, std::path::Path::new("/srv/files/notes.txt"));
}

#[test]
fn test_resolve_enforces_path_limit() {
    let config = txtserve::Config::builder()
        .root_dir("/srv")
        .max_path_len(16)
        .build();
    let share = Share::from_config(&config);

    assert!(share.resolve("short").is_ok());
    assert!(matches!(
        share.resolve("a-rather-long-file-name.txt"),
        Err(TxtError::NameTooLong)
    ));
}

#[test]
fn test_path_limit_reserves_terminator_byte() {
    let config = txtserve::Config::builder()
        .root_dir("/srv")
        .max_path_len(16)
        .build();
    let share = Share::from_config(&config);

    // "/srv/" plus 10 bytes is 15, one under the limit
    assert_eq!(share.resolve("0123456789").unwrap().as_os_str().len(), 15);
    // 16 bytes would leave no room for the terminator
    assert!(matches!(
        share.resolve("0123456789a"),
        Err(TxtError::NameTooLong)
    ));
}

#[test]
fn test_non_utf8_bytes_are_valid() {
    assert!(is_valid_name(&b"caf\xe9"[..]));
    assert!(!is_valid_name(&b"\xff/\xfe"[..]));
}

#[cfg(unix)]
#[test]
fn test_resolve_keeps_raw_bytes() {
    use std::os::unix::ffi::OsStrExt;

    let share = Share::new("/srv");
    let path = share.resolve(&b"caf\xe9"[..]).unwrap();
    assert_eq!(path.as_os_str().as_bytes(), b"/srv/caf\xe9");
}
