//! # txtserve
//!
//! A tiny line-oriented file server and its client:
//! - `LIST`, `GET <name>` and `HEAD <name>` over one-shot TCP connections
//! - Byte-count framing: every body is preceded by its exact size
//! - Names validated as strings before any filesystem access
//! - Concurrent connections served by a worker pool
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              TCP Server (acceptor + workers)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Connection Handler                           │
//! │          read line → dispatch → one response                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Catalog   │          │ Transmitter │
//!   │   (LIST)    │          │ (GET/HEAD)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌─────────────┐
//!               │    Share    │
//!               │ (root dir)  │
//!               └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod files;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TxtError, Result};
pub use config::Config;
pub use files::Share;
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of txtserve
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
