//! Response definitions
//!
//! Represents the one framed response sent per connection.

use std::borrow::Cow;

/// A regular file as reported by LIST
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// Raw name bytes, exactly as stored in the directory
    pub name: Vec<u8>,
    pub size: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<Vec<u8>>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Name for display, with invalid UTF-8 replaced
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// A response to send to the client
///
/// Only the framing is modelled here; a GET body is streamed separately
/// after the `Size` header has been flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `ERR <message>\n`
    Error(String),

    /// `SIZE <size>\n\n`
    Size(u64),

    /// `FILES <count>\n` + `<name>\t<size>\n` per entry + `\n`
    List(Vec<FileEntry>),
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }
}
