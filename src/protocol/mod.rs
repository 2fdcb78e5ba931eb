//! Protocol Module
//!
//! Defines the line-oriented wire protocol.
//!
//! ## Protocol Format
//!
//! One ASCII command line per connection, `\n` terminated (`\r\n` tolerated):
//! - `LIST`        - enumerate regular files in the root
//! - `GET <name>`  - size header followed by the file bytes
//! - `HEAD <name>` - size header only
//!
//! ### Responses
//! - `FILES <count>\n` + `<name>\t<size>\n` per entry + `\n`
//! - `SIZE <size>\n\n` (+ `<size>` raw bytes for GET)
//! - `ERR <message>\n`
//!
//! Every body is preceded by its exact byte count; the reader never scans
//! the body for a terminator.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{FileEntry, Response};
pub use codec::{
    encode_response, encode_size_header, expect_blank_line, parse_entry_line,
    parse_files_line, parse_size_line, read_command, read_line, read_listing,
    read_size_header, write_command, write_response, MAX_REPLY_LINE_LEN,
};
