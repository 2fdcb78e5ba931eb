//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - Worker thread pool fed over a crossbeam channel
//! - One command per connection, then close

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::{serve_one, Connection, Outcome};
pub use client::{Client, Reply};
