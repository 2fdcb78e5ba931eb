//! File name validation
//!
//! A requested name is checked purely as bytes, before it is joined to
//! the root or handed to any filesystem call.

use std::ffi::OsStr;

use crate::error::Result;

/// Whether `name` may be looked up inside the root.
///
/// Rejects the empty name, any `/` or `\`, and any `..` substring. The
/// `..` rule also rejects harmless names such as `a..b`. Any other bytes,
/// including non UTF-8 ones, are accepted.
pub fn is_valid_name(name: impl AsRef<[u8]>) -> bool {
    let name = name.as_ref();
    !name.is_empty()
        && !name.iter().any(|&b| b == b'/' || b == b'\\')
        && !name.windows(2).any(|pair| pair == b"..")
}

/// Whether a name can be written on a single listing line
pub(crate) fn is_listable_name(name: &[u8]) -> bool {
    is_valid_name(name) && !name.iter().any(|&b| b == b'\r' || b == b'\n')
}

/// Reinterpret a validated name as a path component
#[cfg(unix)]
pub(crate) fn name_to_os(name: &[u8]) -> Result<&OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Ok(OsStr::from_bytes(name))
}

/// Reinterpret a validated name as a path component
///
/// Outside unix, file names are Unicode; other bytes cannot name a file.
#[cfg(not(unix))]
pub(crate) fn name_to_os(name: &[u8]) -> Result<&OsStr> {
    std::str::from_utf8(name)
        .map(OsStr::new)
        .map_err(|_| crate::error::TxtError::BadName)
}
