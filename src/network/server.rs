//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::error::Result;
use crate::files::Share;

use super::Connection;

/// Cloneable stop signal for a running [`Server`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop accepting new connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for txtserve
pub struct Server {
    config: Arc<Config>,
    share: Arc<Share>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Validate the config and bind the listening socket
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Polled so the shutdown flag is noticed without a pending accept
        listener.set_nonblocking(true)?;

        Ok(Self {
            share: Arc::new(Share::from_config(&config)),
            config: Arc::new(config),
            listener,
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Run the accept loop until shutdown (blocking).
    ///
    /// In-flight connections are finished before this returns.
    pub fn run(&self) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);

        let mut workers = Vec::with_capacity(self.config.max_connections);
        for id in 0..self.config.max_connections {
            workers.push(self.spawn_worker(id, rx.clone())?);
        }
        drop(rx);

        tracing::info!(
            "Serving {} on {} with {} workers",
            self.share.root().display(),
            self.local_addr()?,
            workers.len()
        );

        let poll = Duration::from_millis(self.config.accept_poll_ms.max(1));
        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers exited, stopping accept loop");
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(poll);
                }
            }
        }

        tracing::info!("Shutdown requested, waiting for in-flight connections");
        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let share = Arc::clone(&self.share);
        let config = Arc::clone(&self.config);

        let handle = thread::Builder::new()
            .name(format!("txtserve-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    // Every failure stays contained to its own connection
                    if let Err(e) = serve_stream(stream, &share, &config) {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                }
            })?;
        Ok(handle)
    }
}

fn serve_stream(stream: TcpStream, share: &Arc<Share>, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, Arc::clone(share), config.max_line_len)?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.handle()?;
    Ok(())
}
