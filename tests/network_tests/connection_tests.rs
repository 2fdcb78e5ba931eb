//! Tests for the connection handler
//!
//! The handler is driven with in-memory streams: the request is a byte
//! cursor and the response is captured in a Vec.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, ErrorKind, Read};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use txtserve::network::{serve_one, Connection, Outcome};
use txtserve::protocol::CommandType;
use txtserve::Share;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_share() -> (TempDir, Share) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), b"hi\n").unwrap();
    let share = Share::new(dir.path());
    (dir, share)
}

fn exchange(share: &Share, request: &[u8]) -> (Outcome, Vec<u8>) {
    let mut reader = Cursor::new(request.to_vec());
    let mut out = Vec::new();
    let outcome = serve_one(&mut reader, &mut out, share, 512).unwrap();
    (outcome, out)
}

// =============================================================================
// Command Dispatch Tests
// =============================================================================

#[test]
fn test_get() {
    let (_dir, share) = setup_share();
    let (outcome, out) = exchange(&share, b"GET notes.txt\n");
    assert_eq!(outcome, Outcome::Answered(CommandType::Get));
    assert_eq!(out, b"SIZE 3\n\nhi\n");
}

#[test]
fn test_head() {
    let (_dir, share) = setup_share();
    let (outcome, out) = exchange(&share, b"HEAD notes.txt\r\n");
    assert_eq!(outcome, Outcome::Answered(CommandType::Head));
    assert_eq!(out, b"SIZE 3\n\n");
}

#[test]
fn test_list() {
    let (dir, share) = setup_share();
    fs::write(dir.path().join("b.txt"), b"").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();

    let (outcome, out) = exchange(&share, b"LIST\n");
    assert_eq!(outcome, Outcome::Answered(CommandType::List));

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.split('\n');
    assert_eq!(lines.next(), Some("FILES 2"));
    let entries: HashSet<&str> = lines.by_ref().take(2).collect();
    assert_eq!(entries, HashSet::from(["notes.txt\t3", "b.txt\t0"]));
    assert!(text.ends_with("\n\n"));
}

#[test]
fn test_unknown_command() {
    let (_dir, share) = setup_share();
    let (outcome, out) = exchange(&share, b"PING\n");
    assert_eq!(outcome, Outcome::Rejected("unknown command".into()));
    assert_eq!(out, b"ERR unknown command\n");
}

#[test]
fn test_traversal_is_bad_name() {
    let (_dir, share) = setup_share();
    for request in [&b"GET ../etc/passwd\n"[..], b"HEAD x/../y\n", b"GET a..b\n", b"GET \n"] {
        let (_, out) = exchange(&share, request);
        assert_eq!(out, b"ERR bad name\n");
    }
}

#[test]
fn test_missing_file() {
    let (_dir, share) = setup_share();
    let (outcome, out) = exchange(&share, b"GET missing.txt\n");
    assert!(matches!(outcome, Outcome::Rejected(_)));
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("ERR open ("), "got {:?}", text);
    assert!(text.ends_with(")\n"));
    assert_eq!(text.matches('\n').count(), 1);
}

#[test]
fn test_directory_rejected() {
    let (dir, share) = setup_share();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let (_, out) = exchange(&share, b"GET sub\n");
    assert_eq!(out, b"ERR not a regular file\n");
}

// =============================================================================
// Line Handling Tests
// =============================================================================

#[test]
fn test_no_command_writes_nothing() {
    let (_dir, share) = setup_share();

    let (outcome, out) = exchange(&share, b"");
    assert_eq!(outcome, Outcome::NoCommand);
    assert!(out.is_empty());

    let (outcome, out) = exchange(&share, b"GET notes.txt");
    assert_eq!(outcome, Outcome::NoCommand);
    assert!(out.is_empty());
}

#[test]
fn test_line_too_long() {
    let (_dir, share) = setup_share();
    let mut request = b"GET ".to_vec();
    request.extend(std::iter::repeat(b'a').take(600));
    request.push(b'\n');

    let (outcome, out) = exchange(&share, &request);
    assert_eq!(outcome, Outcome::Rejected("line too long".into()));
    assert_eq!(out, b"ERR line too long\n");
}

#[test]
fn test_only_first_command_is_served() {
    let (_dir, share) = setup_share();
    let (outcome, out) = exchange(&share, b"HEAD notes.txt\nGET notes.txt\n");
    assert_eq!(outcome, Outcome::Answered(CommandType::Head));
    assert_eq!(out, b"SIZE 3\n\n");
}

// =============================================================================
// Transport Tests
// =============================================================================

#[test]
fn test_read_timeout_is_reported_as_dropped() {
    let (_dir, share) = setup_share();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let mut peer = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (stream, _) = listener.accept().unwrap();

    let mut connection = Connection::new(stream, Arc::new(share), 512).unwrap();
    connection.set_timeouts(50, 0).unwrap();

    // The peer stays connected and silent
    let started = Instant::now();
    let outcome = connection.handle().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    match outcome {
        Outcome::Dropped(kind) => {
            assert!(
                matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut),
                "kind {:?}",
                kind
            );
        }
        other => panic!("Expected dropped connection, got {:?}", other),
    }

    // Nothing was framed for the peer
    peer.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut buf = Vec::new();
    let _ = peer.read_to_end(&mut buf);
    assert!(buf.is_empty());
}

#[test]
fn test_peer_closing_early_is_no_command() {
    let (_dir, share) = setup_share();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let peer = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (stream, _) = listener.accept().unwrap();
    drop(peer);

    let mut connection = Connection::new(stream, Arc::new(share), 512).unwrap();
    connection.set_timeouts(2_000, 0).unwrap();
    assert_eq!(connection.handle().unwrap(), Outcome::NoCommand);
}
