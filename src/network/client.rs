//! Protocol Client
//!
//! Issues one command per connection and decodes the framed reply.
//!
//! A body is read by its announced size only: exactly `SIZE` bytes, never
//! scanning for a terminator. Anything short of that is an error.

use std::io::{self, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, TxtError};
use crate::protocol::{read_listing, read_size_header, write_command, Command, FileEntry};

/// Largest up-front allocation for a GET body
const MAX_BODY_PREALLOC: u64 = 1024 * 1024;

/// A decoded reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// LIST
    Listing(Vec<FileEntry>),

    /// HEAD
    Size(u64),

    /// GET
    File { size: u64, body: Vec<u8> },
}

/// Client side of one connection
///
/// Every request consumes the client, as the server closes the connection
/// after its single response.
pub struct Client<S: Read + Write> {
    reader: BufReader<S>,
}

impl Client<TcpStream> {
    /// Connect to the first reachable address of `addr`.
    ///
    /// `timeout` bounds the connect as well as every read and write.
    pub fn connect(addr: impl ToSocketAddrs, timeout: Option<Duration>) -> Result<Self> {
        let mut last_error = None;
        for candidate in addr.to_socket_addrs()? {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_read_timeout(timeout)?;
                    stream.set_write_timeout(timeout)?;
                    tracing::debug!("Connected to {}", candidate);
                    return Ok(Self::new(stream));
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address resolved"))
            .into())
    }
}

impl<S: Read + Write> Client<S> {
    /// Wrap an established connection
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    /// Send `command` and decode its reply
    pub fn request(mut self, command: &Command) -> Result<Reply> {
        match command {
            Command::List => {
                self.send(command)?;
                Ok(Reply::Listing(read_listing(&mut self.reader)?))
            }
            Command::Head { .. } => {
                self.send(command)?;
                Ok(Reply::Size(read_size_header(&mut self.reader)?))
            }
            Command::Get { .. } => {
                self.send(command)?;
                let size = read_size_header(&mut self.reader)?;
                let mut body = Vec::with_capacity(size.min(MAX_BODY_PREALLOC) as usize);
                let received = (&mut self.reader).take(size).read_to_end(&mut body)? as u64;
                check_body(size, received)?;
                Ok(Reply::File { size, body })
            }
            Command::Unknown { line } => Err(TxtError::Protocol(format!(
                "refusing to send unknown command {:?}",
                line
            ))),
        }
    }

    /// LIST
    pub fn list(self) -> Result<Vec<FileEntry>> {
        match self.request(&Command::List)? {
            Reply::Listing(entries) => Ok(entries),
            other => Err(unexpected(other)),
        }
    }

    /// HEAD: size only
    pub fn head(self, name: impl AsRef<[u8]>) -> Result<u64> {
        match self.request(&Command::Head {
            name: name.as_ref().to_vec(),
        })? {
            Reply::Size(size) => Ok(size),
            other => Err(unexpected(other)),
        }
    }

    /// GET into memory
    pub fn get(self, name: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        match self.request(&Command::Get {
            name: name.as_ref().to_vec(),
        })? {
            Reply::File { body, .. } => Ok(body),
            other => Err(unexpected(other)),
        }
    }

    /// GET streamed into `out`; returns the byte count.
    ///
    /// On a short body the bytes already copied stay in `out` and an error
    /// is returned.
    pub fn get_to<W: Write>(mut self, name: impl AsRef<[u8]>, out: &mut W) -> Result<u64> {
        self.send(&Command::Get {
            name: name.as_ref().to_vec(),
        })?;
        let size = read_size_header(&mut self.reader)?;
        let received = io::copy(&mut (&mut self.reader).take(size), out)?;
        out.flush()?;
        check_body(size, received)?;
        Ok(size)
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        tracing::trace!("Sending {:?}", command);
        write_command(self.reader.get_mut(), command)
    }
}

fn check_body(expected: u64, received: u64) -> Result<()> {
    if received < expected {
        return Err(TxtError::ShortBody { expected, received });
    }
    Ok(())
}

fn unexpected(reply: Reply) -> TxtError {
    TxtError::Protocol(format!("unexpected reply {:?}", reply))
}
