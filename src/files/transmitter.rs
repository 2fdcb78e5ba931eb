//! File Transmitter
//!
//! Opens a named file in the share and streams it behind a `SIZE` header.
//!
//! The header carries the size seen at open time. If the file shrinks
//! before the body is fully read, the body stops short and the connection
//! is closed without correcting the header; the client sees a short body.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TxtError};
use crate::protocol::encode_size_header;

use super::Share;

/// A regular file opened for transmission
#[derive(Debug)]
pub struct OpenFile {
    file: File,
    size: u64,
}

impl OpenFile {
    /// Size reported by stat when the file was opened
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Open `name` inside the share.
///
/// Every error here happens before a byte is written and is answered with
/// an `ERR` frame.
pub fn open(share: &Share, name: impl AsRef<[u8]>) -> Result<OpenFile> {
    let path = share.resolve(name)?;

    // Refuse FIFOs and devices before open() can block on them
    if let Ok(metadata) = fs::metadata(&path) {
        if !metadata.is_file() {
            return Err(TxtError::NotRegularFile);
        }
    }

    let file = File::open(&path).map_err(TxtError::Open)?;
    let metadata = file.metadata().map_err(TxtError::Open)?;
    if !metadata.is_file() {
        return Err(TxtError::NotRegularFile);
    }

    Ok(OpenFile {
        file,
        size: metadata.len(),
    })
}

/// Write `SIZE <n>\n\n`, flush it, then (for GET) stream the body.
///
/// Returns the number of body bytes written.
pub fn transmit<W: Write>(
    mut open: OpenFile,
    include_body: bool,
    chunk_size: usize,
    writer: &mut W,
) -> Result<u64> {
    writer.write_all(&encode_size_header(open.size))?;
    writer.flush()?;

    if !include_body || open.size == 0 {
        return Ok(0);
    }

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut remaining = open.size;
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let read = match open.file.read(&mut buf[..want]) {
            Ok(0) => {
                tracing::warn!(
                    "File shrank while sending: {} of {} bytes missing",
                    remaining,
                    open.size
                );
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buf[..read])?;
        remaining -= read as u64;
    }
    writer.flush()?;

    Ok(open.size - remaining)
}

/// Open and transmit in one step
pub fn send<W: Write>(
    share: &Share,
    name: impl AsRef<[u8]>,
    include_body: bool,
    writer: &mut W,
) -> Result<u64> {
    let open = open(share, name)?;
    transmit(open, include_body, share.chunk_size(), writer)
}
