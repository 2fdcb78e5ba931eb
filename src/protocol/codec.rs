//! Protocol codec
//!
//! Line reading, response framing and client-side header parsing.
//!
//! ## Wire Format
//!
//! ```text
//! LIST\n          ->  FILES <count>\n  (<name>\t<size>\n)*  \n
//! GET <name>\n    ->  SIZE <size>\n  \n  <size raw bytes>
//! HEAD <name>\n   ->  SIZE <size>\n  \n
//! anything else   ->  ERR unknown command\n
//! ```
//!
//! Every failure is a single `ERR <message>\n` line.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, FileEntry, Response};
use crate::error::{Result, TxtError};

/// Longest header or listing line the client accepts (terminator included)
pub const MAX_REPLY_LINE_LEN: usize = 4096;

// =============================================================================
// Line Reading
// =============================================================================

/// Read one `\n`-terminated line of at most `max_len` bytes.
///
/// Returns `Ok(None)` when the stream ends before a full line arrived, and
/// `LineTooLong` when `max_len` bytes were read without finding `\n`.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::with_capacity(max_len.min(512));
    let read = (&mut *reader)
        .take(max_len as u64)
        .read_until(b'\n', &mut line)?;

    if line.last() == Some(&b'\n') {
        return Ok(Some(line));
    }
    if read >= max_len {
        return Err(TxtError::LineTooLong);
    }
    Ok(None)
}

/// Read and parse the command line of a connection
pub fn read_command<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<Command>> {
    let Some(line) = read_line(reader, max_len)? else {
        return Ok(None);
    };
    Ok(Some(Command::parse(&line)))
}

/// Write a command line in a single write
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let line = command.to_line()?;
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Encode a response frame (a GET body is not part of the frame)
pub fn encode_response(response: &Response) -> Bytes {
    match response {
        Response::Error(message) => {
            let message = message.replace(['\r', '\n'], " ");
            let mut buf = BytesMut::with_capacity(5 + message.len());
            buf.put_slice(b"ERR ");
            buf.put_slice(message.as_bytes());
            buf.put_u8(b'\n');
            buf.freeze()
        }
        Response::Size(size) => encode_size_header(*size),
        Response::List(entries) => {
            let mut buf = BytesMut::with_capacity(16 + entries.len() * 32);
            buf.put_slice(format!("FILES {}\n", entries.len()).as_bytes());
            for entry in entries {
                buf.put_slice(&entry.name);
                buf.put_u8(b'\t');
                buf.put_slice(entry.size.to_string().as_bytes());
                buf.put_u8(b'\n');
            }
            buf.put_u8(b'\n');
            buf.freeze()
        }
    }
}

/// `SIZE <size>\n\n`
pub fn encode_size_header(size: u64) -> Bytes {
    Bytes::from(format!("SIZE {}\n\n", size))
}

/// Write a response frame and flush it
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Decoding (client side)
// =============================================================================

/// Parse a `SIZE <n>` line
pub fn parse_size_line(line: &[u8]) -> Result<u64> {
    let text = line_text(line)?;
    check_remote_error(text)?;

    let value = text.strip_prefix("SIZE ").ok_or_else(|| {
        TxtError::Protocol(format!("bad SIZE header: {:?}", text))
    })?;
    parse_count(value, "SIZE")
}

/// Parse a `FILES <count>` line
pub fn parse_files_line(line: &[u8]) -> Result<usize> {
    let text = line_text(line)?;
    check_remote_error(text)?;

    let value = text.strip_prefix("FILES ").ok_or_else(|| {
        TxtError::Protocol(format!("bad FILES header: {:?}", text))
    })?;
    let count = parse_count(value, "FILES")?;
    usize::try_from(count)
        .map_err(|_| TxtError::Protocol(format!("FILES count {} out of range", count)))
}

/// Parse a `<name>\t<size>` listing line
///
/// The size follows the last tab, so names may themselves contain tabs.
/// Name bytes are kept verbatim, UTF-8 or not.
pub fn parse_entry_line(line: &[u8]) -> Result<FileEntry> {
    let line = strip_terminator(line);
    let tab = line.iter().rposition(|&b| b == b'\t').ok_or_else(|| {
        TxtError::Protocol(format!(
            "bad listing line: {:?}",
            String::from_utf8_lossy(line)
        ))
    })?;
    let (name, size) = (&line[..tab], &line[tab + 1..]);
    if name.is_empty() {
        return Err(TxtError::Protocol("listing line with empty name".into()));
    }
    let size = std::str::from_utf8(size)
        .map_err(|_| TxtError::Protocol("listing size is not valid UTF-8".into()))?;
    Ok(FileEntry::new(name, parse_count(size, "listing size")?))
}

/// Check that a line is the empty separator line
pub fn expect_blank_line(line: &[u8]) -> Result<()> {
    match line {
        b"\n" | b"\r\n" => Ok(()),
        other => Err(TxtError::Protocol(format!(
            "expected blank line, got {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Read `SIZE <n>\n` followed by the blank separator line
pub fn read_size_header<R: BufRead>(reader: &mut R) -> Result<u64> {
    let line = read_reply_line(reader, "SIZE header")?;
    let size = parse_size_line(&line)?;

    let blank = read_reply_line(reader, "blank line")?;
    expect_blank_line(&blank)?;
    Ok(size)
}

/// Read a complete LIST response
pub fn read_listing<R: BufRead>(reader: &mut R) -> Result<Vec<FileEntry>> {
    let line = read_reply_line(reader, "FILES header")?;
    let count = parse_files_line(&line)?;

    let mut entries = Vec::with_capacity(count.min(4096));
    loop {
        let line = read_reply_line(reader, "listing line")?;
        if expect_blank_line(&line).is_ok() {
            break;
        }
        entries.push(parse_entry_line(&line)?);
    }

    if entries.len() != count {
        return Err(TxtError::Protocol(format!(
            "FILES announced {} entries, received {}",
            count,
            entries.len()
        )));
    }
    Ok(entries)
}

fn read_reply_line<R: BufRead>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    match read_line(reader, MAX_REPLY_LINE_LEN) {
        Ok(Some(line)) => Ok(line),
        Ok(None) => Err(TxtError::Protocol(format!(
            "connection closed before {}",
            what
        ))),
        Err(TxtError::LineTooLong) => Err(TxtError::Protocol(format!("{} too long", what))),
        Err(e) => Err(e),
    }
}

/// Strip the terminator and require UTF-8
fn line_text(line: &[u8]) -> Result<&str> {
    std::str::from_utf8(strip_terminator(line))
        .map_err(|_| TxtError::Protocol("response line is not valid UTF-8".into()))
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn check_remote_error(text: &str) -> Result<()> {
    match text.strip_prefix("ERR ") {
        Some(message) => Err(TxtError::Remote(message.to_string())),
        None => Ok(()),
    }
}

/// Decimal digits only: no sign, no whitespace, no empty value
fn parse_count(value: &str, what: &str) -> Result<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TxtError::Protocol(format!(
            "{} value {:?} is not a non-negative integer",
            what, value
        )));
    }
    value
        .parse::<u64>()
        .map_err(|_| TxtError::Protocol(format!("{} value {} out of range", what, value)))
}
