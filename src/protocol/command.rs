//! Command definitions
//!
//! Represents the single command line a client sends per connection.
//!
//! Names are raw bytes: the wire carries whatever the filesystem uses,
//! UTF-8 or not.

use crate::error::{Result, TxtError};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    List,
    Get,
    Head,
    Unknown,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enumerate the regular files in the root
    List,

    /// Size header followed by the file's bytes
    Get { name: Vec<u8> },

    /// Size header only
    Head { name: Vec<u8> },

    /// Anything else, kept (lossily) for logging
    Unknown { line: String },
}

impl Command {
    /// Parse one command line.
    ///
    /// Trailing CR/LF are stripped. The name is the rest of the line after
    /// the single separating space, embedded whitespace included.
    pub fn parse(line: &[u8]) -> Self {
        let mut line = line;
        while let [rest @ .., b'\r' | b'\n'] = line {
            line = rest;
        }

        if line == b"LIST" {
            Command::List
        } else if let Some(name) = line.strip_prefix(b"GET ") {
            Command::Get {
                name: name.to_vec(),
            }
        } else if let Some(name) = line.strip_prefix(b"HEAD ") {
            Command::Head {
                name: name.to_vec(),
            }
        } else {
            Command::Unknown {
                line: String::from_utf8_lossy(line).into_owned(),
            }
        }
    }

    /// Render the command as a complete wire line, terminator included.
    ///
    /// Names carrying CR or LF would smuggle a second line and are refused.
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let (verb, arg): (&[u8], &[u8]) = match self {
            Command::List => return Ok(b"LIST\n".to_vec()),
            Command::Get { name } => (&b"GET "[..], name.as_slice()),
            Command::Head { name } => (&b"HEAD "[..], name.as_slice()),
            Command::Unknown { line } => (&b""[..], line.as_bytes()),
        };
        let arg = checked_name(arg)?;

        let mut out = Vec::with_capacity(verb.len() + arg.len() + 1);
        out.extend_from_slice(verb);
        out.extend_from_slice(arg);
        out.push(b'\n');
        Ok(out)
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Get { .. } => CommandType::Get,
            Command::Head { .. } => CommandType::Head,
            Command::Unknown { .. } => CommandType::Unknown,
        }
    }
}

fn checked_name(name: &[u8]) -> Result<&[u8]> {
    if name.iter().any(|&b| b == b'\r' || b == b'\n') {
        return Err(TxtError::Protocol(format!(
            "name {:?} contains a line terminator",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(name)
}
