//! Files Module
//!
//! The read-only directory exposed over the wire.
//!
//! ## Components
//! - `name`: byte-level validation of requested names
//! - `catalog`: directory enumeration for LIST
//! - `transmitter`: SIZE header and chunked body for GET/HEAD

mod name;
pub mod catalog;
pub mod transmitter;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, TxtError};
use crate::protocol::FileEntry;

use name::name_to_os;

pub use name::is_valid_name;
pub use transmitter::OpenFile;

/// The served root directory and its limits
///
/// Holds no mutable state, so one `Arc<Share>` is shared by every worker.
#[derive(Debug, Clone)]
pub struct Share {
    root: PathBuf,
    max_path_len: usize,
    chunk_size: usize,
    list_limit: Option<usize>,
}

impl Share {
    /// Share `root` with default limits
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(&Config::builder().root_dir(root).build())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.root_dir.clone(),
            max_path_len: config.max_path_len,
            chunk_size: config.chunk_size,
            list_limit: config.list_limit,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn list_limit(&self) -> Option<usize> {
        self.list_limit
    }

    /// Validate `name` and join it to the root.
    ///
    /// The joined path must be strictly shorter than `max_path_len`, which
    /// keeps one byte free for a terminator. No filesystem access happens here.
    pub fn resolve(&self, name: impl AsRef<[u8]>) -> Result<PathBuf> {
        let name = name.as_ref();
        if !is_valid_name(name) {
            return Err(TxtError::BadName);
        }
        let path = self.root.join(name_to_os(name)?);
        if path.as_os_str().len() >= self.max_path_len {
            return Err(TxtError::NameTooLong);
        }
        Ok(path)
    }

    /// Enumerate regular files (see [`catalog::list`])
    pub fn list(&self) -> Result<Vec<FileEntry>> {
        catalog::list(self)
    }

    /// Open a file for transmission (see [`transmitter::open`])
    pub fn open(&self, name: impl AsRef<[u8]>) -> Result<OpenFile> {
        transmitter::open(self, name)
    }
}
