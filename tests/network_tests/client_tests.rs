//! Tests for the protocol client
//!
//! A scripted stream plays the server: reads come from a canned reply and
//! writes are captured for inspection.

use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

use txtserve::network::Reply;
use txtserve::protocol::{Command, FileEntry};
use txtserve::{Client, TxtError};

// =============================================================================
// Helper Functions
// =============================================================================

struct ScriptedStream {
    reply: Cursor<Vec<u8>>,
    sent: Rc<RefCell<Vec<u8>>>,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reply.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sent.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn scripted(reply: &[u8]) -> (Client<ScriptedStream>, Rc<RefCell<Vec<u8>>>) {
    let sent = Rc::new(RefCell::new(Vec::new()));
    let stream = ScriptedStream {
        reply: Cursor::new(reply.to_vec()),
        sent: Rc::clone(&sent),
    };
    (Client::new(stream), sent)
}

// =============================================================================
// Success Tests
// =============================================================================

#[test]
fn test_get() {
    let (client, sent) = scripted(b"SIZE 3\n\nhi\n");
    let body = client.get("notes.txt").unwrap();
    assert_eq!(body, b"hi\n");
    assert_eq!(&*sent.borrow(), b"GET notes.txt\n");
}

#[test]
fn test_get_ignores_trailing_bytes() {
    let (client, _) = scripted(b"SIZE 2\n\nhiEXTRA");
    assert_eq!(client.get("x").unwrap(), b"hi");
}

#[test]
fn test_head() {
    let (client, sent) = scripted(b"SIZE 3\n\n");
    assert_eq!(client.head("notes.txt").unwrap(), 3);
    assert_eq!(&*sent.borrow(), b"HEAD notes.txt\n");
}

#[test]
fn test_list() {
    let (client, sent) = scripted(b"FILES 2\na.txt\t3\nb.txt\t0\n\n");
    let entries = client.list().unwrap();
    assert_eq!(
        entries,
        vec![FileEntry::new("a.txt", 3), FileEntry::new("b.txt", 0)]
    );
    assert_eq!(&*sent.borrow(), b"LIST\n");
}

#[test]
fn test_get_to_streams_body() {
    let (client, _) = scripted(b"SIZE 5\n\nhello");
    let mut out = Vec::new();
    assert_eq!(client.get_to("greeting", &mut out).unwrap(), 5);
    assert_eq!(out, b"hello");
}

#[test]
fn test_request_reply_variants() {
    let (client, _) = scripted(b"SIZE 1\n\nx");
    let reply = client
        .request(&Command::Get { name: "x".into() })
        .unwrap();
    assert_eq!(
        reply,
        Reply::File {
            size: 1,
            body: b"x".to_vec()
        }
    );
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_short_body() {
    let (client, _) = scripted(b"SIZE 10\n\nhi");
    match client.get("x") {
        Err(TxtError::ShortBody { expected, received }) => {
            assert_eq!(expected, 10);
            assert_eq!(received, 2);
        }
        other => panic!("Expected short body, got {:?}", other),
    }
}

#[test]
fn test_server_error_frame() {
    let (client, _) = scripted(b"ERR bad name\n");
    match client.get("../etc/passwd") {
        Err(TxtError::Remote(message)) => assert_eq!(message, "bad name"),
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[test]
fn test_missing_blank_line_reads_no_body() {
    let (client, _) = scripted(b"SIZE 2\nhi");
    let mut out = Vec::new();
    let result = client.get_to("x", &mut out);
    assert!(matches!(result, Err(TxtError::Protocol(_))));
    assert!(out.is_empty());
}

#[test]
fn test_negative_size_is_protocol_error() {
    let (client, _) = scripted(b"SIZE -1\n\n");
    assert!(matches!(client.head("x"), Err(TxtError::Protocol(_))));
}

#[test]
fn test_unknown_command_is_not_sent() {
    let (client, sent) = scripted(b"");
    let result = client.request(&Command::Unknown {
        line: "PING".into(),
    });
    assert!(matches!(result, Err(TxtError::Protocol(_))));
    assert!(sent.borrow().is_empty());
}

#[test]
fn test_name_with_newline_is_not_sent() {
    let (client, sent) = scripted(b"");
    assert!(matches!(
        client.get("a\nLIST"),
        Err(TxtError::Protocol(_))
    ));
    assert!(sent.borrow().is_empty());
}
