//! Directory Catalog
//!
//! Enumerates the regular files of the root for LIST.
//!
//! ## Behavior
//! - The directory is read from scratch on every call; nothing is cached
//! - Entries come back in directory order, which is unspecified
//! - Directories, devices and symlinks to non-regular files are skipped
//! - Names that fail validation or cannot be framed on one line are skipped
//! - On unix names are listed as raw bytes, UTF-8 or not

use std::ffi::OsString;
use std::fs;

use crate::error::{Result, TxtError};
use crate::protocol::FileEntry;

use super::name::is_listable_name;
use super::Share;

/// List the regular files directly inside the share root
pub fn list(share: &Share) -> Result<Vec<FileEntry>> {
    let dir = fs::read_dir(share.root()).map_err(TxtError::OpenDir)?;

    let mut entries = Vec::new();
    for entry in dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        let Some(name) = name_bytes(entry.file_name()) else {
            tracing::debug!("Skipping non Unicode name {:?}", entry.file_name());
            continue;
        };
        if !is_listable_name(&name) {
            tracing::debug!(
                "Skipping unlistable name {:?}",
                String::from_utf8_lossy(&name)
            );
            continue;
        }

        // stat, not lstat: a symlink counts when its target is a regular file
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Skipping {:?}: {}", String::from_utf8_lossy(&name), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        if let Some(limit) = share.list_limit() {
            if entries.len() >= limit {
                return Err(TxtError::TooManyFiles);
            }
        }
        entries.push(FileEntry::new(name, metadata.len()));
    }

    Ok(entries)
}

#[cfg(unix)]
fn name_bytes(name: OsString) -> Option<Vec<u8>> {
    use std::os::unix::ffi::OsStringExt;
    Some(name.into_vec())
}

#[cfg(not(unix))]
fn name_bytes(name: OsString) -> Option<Vec<u8>> {
    name.into_string().ok().map(String::into_bytes)
}
