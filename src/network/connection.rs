//! Connection Handler
//!
//! Serves exactly one command on an accepted connection.
//!
//! ## States
//! `AwaitCommand -> Dispatch -> RespondAndClose`
//! - End of input before a full line: nothing is written
//! - Rejections (unknown command, bad name, ...): one `ERR` frame
//! - Transport failures: the connection is dropped, with the error kind
//!   kept in the outcome

use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, TxtError};
use crate::files::{transmitter, Share};
use crate::protocol::{read_command, write_response, Command, CommandType, Response};

const LINGER_TIMEOUT: Duration = Duration::from_millis(200);
const LINGER_MAX_BYTES: u64 = 64 * 1024;

/// How a connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The peer closed before sending a complete line
    NoCommand,

    /// A success frame was written
    Answered(CommandType),

    /// An `ERR` frame was written
    Rejected(String),

    /// The transport failed (timeout, reset, broken pipe) before or during
    /// the response; whatever was written so far is all the peer gets
    Dropped(ErrorKind),
}

/// Read one command from `reader` and write its response to `writer`.
///
/// The caller owns the transport and closes it afterwards.
pub fn serve_one<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    share: &Share,
    max_line_len: usize,
) -> Result<Outcome> {
    let command = match read_command(reader, max_line_len) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(Outcome::NoCommand),
        Err(e) if e.is_frameable() => return reject(writer, e),
        Err(e) => return Err(e),
    };

    tracing::trace!("Received command: {:?}", command);

    let command_type = command.command_type();
    let result = match command {
        Command::List => share
            .list()
            .and_then(|entries| write_response(writer, &Response::List(entries))),
        Command::Get { name } => transmitter::send(share, &name, true, writer).map(|_| ()),
        Command::Head { name } => transmitter::send(share, &name, false, writer).map(|_| ()),
        Command::Unknown { .. } => Err(TxtError::UnknownCommand),
    };

    match result {
        Ok(()) => Ok(Outcome::Answered(command_type)),
        Err(e) if e.is_frameable() => reject(writer, e),
        Err(e) => Err(e),
    }
}

fn reject<W: Write>(writer: &mut W, error: TxtError) -> Result<Outcome> {
    let message = error.to_string();
    write_response(writer, &Response::error(message.clone()))?;
    Ok(Outcome::Rejected(message))
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// The served directory
    share: Arc<Share>,

    max_line_len: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, share: Arc<Share>, max_line_len: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            share,
            max_line_len,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Serve the one command of this connection, then close it.
    ///
    /// Peer disconnects and timeouts end the connection with
    /// [`Outcome::Dropped`]; they are never reported back over the wire.
    pub fn handle(mut self) -> Result<Outcome> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let result = serve_one(
            &mut self.reader,
            &mut self.writer,
            &self.share,
            self.max_line_len,
        );

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(TxtError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Dropped {} ({:?}): {}",
                    self.peer_addr,
                    e.kind(),
                    e
                );
                return Ok(Outcome::Dropped(e.kind()));
            }
            Err(e) => {
                tracing::warn!("Connection {} aborted: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        match &outcome {
            Outcome::NoCommand => {
                tracing::debug!("Client {} closed without a command", self.peer_addr)
            }
            Outcome::Answered(command) => {
                tracing::debug!("Answered {:?} for {}", command, self.peer_addr)
            }
            Outcome::Rejected(message) => {
                tracing::debug!("Rejected request from {}: {}", self.peer_addr, message)
            }
            Outcome::Dropped(kind) => {
                tracing::debug!("Dropped {} ({:?})", self.peer_addr, kind)
            }
        }

        self.writer.flush()?;
        let _ = self.writer.get_ref().shutdown(Shutdown::Write);
        self.linger();
        Ok(outcome)
    }

    /// Discard whatever the peer still sends until it closes.
    ///
    /// Unread input at close turns the FIN into a reset, which can discard
    /// the response on the client side.
    fn linger(&mut self) {
        let _ = self.reader.get_ref().set_read_timeout(Some(LINGER_TIMEOUT));
        let _ = io::copy(&mut (&mut self.reader).take(LINGER_MAX_BYTES), &mut io::sink());
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
