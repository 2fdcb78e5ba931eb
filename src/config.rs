//! Configuration for txtserve
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, TxtError};

/// Main configuration for a txtserve instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Share Configuration
    // -------------------------------------------------------------------------
    /// Directory whose regular files are served (read-only)
    pub root_dir: PathBuf,

    /// Max bytes of `root_dir/name` once joined
    pub max_path_len: usize,

    /// Bytes read from disk per write during a GET body
    pub chunk_size: usize,

    /// Max entries in one LIST response; `None` lists everything
    pub list_limit: Option<usize>,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Max bytes of a command line, terminator included
    pub max_line_len: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Worker threads, i.e. connections served at the same time
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Sleep between polls of the non-blocking listener (milliseconds)
    pub accept_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            max_path_len: 1024,
            chunk_size: 8 * 1024, // 8 KiB
            list_limit: None,
            max_line_len: 512,
            listen_addr: "0.0.0.0:7070".to_string(),
            max_connections: 64,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            accept_poll_ms: 50,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can actually serve requests
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.is_dir() {
            return Err(TxtError::Config(format!(
                "root {} is not a directory",
                self.root_dir.display()
            )));
        }
        if self.max_connections == 0 {
            return Err(TxtError::Config("max_connections must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(TxtError::Config("chunk_size must be at least 1".into()));
        }
        // "HEAD x\n" is the shortest useful request
        if self.max_line_len < 8 {
            return Err(TxtError::Config(format!(
                "max_line_len {} is too small",
                self.max_line_len
            )));
        }
        if self.max_path_len == 0 {
            return Err(TxtError::Config("max_path_len must be at least 1".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the served directory
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the maximum joined path length (in bytes)
    pub fn max_path_len(mut self, len: usize) -> Self {
        self.config.max_path_len = len;
        self
    }

    /// Set the body chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Cap the number of entries a LIST may return
    pub fn list_limit(mut self, limit: Option<usize>) -> Self {
        self.config.list_limit = limit;
        self
    }

    /// Set the maximum command line length (in bytes)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the accept poll interval (in milliseconds)
    pub fn accept_poll_ms(mut self, ms: u64) -> Self {
        self.config.accept_poll_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
