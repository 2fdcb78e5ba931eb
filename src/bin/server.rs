//! txtserve Server Binary
//!
//! Serves the regular files of one directory over TCP.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use txtserve::{Config, Server};

/// txtserve Server
#[derive(Parser, Debug)]
#[command(name = "txtserve")]
#[command(about = "Serve a directory's files with LIST, GET and HEAD")]
#[command(version)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Directory to serve
    root: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Connections served at the same time
    #[arg(short, long, default_value = "64")]
    workers: usize,

    /// Read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    write_timeout_ms: u64,

    /// Fail LIST with "too many files" beyond this many entries
    #[arg(long)]
    list_limit: Option<usize>,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,txtserve=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let listen_addr = if args.host.contains(':') {
        format!("[{}]:{}", args.host, args.port)
    } else {
        format!("{}:{}", args.host, args.port)
    };

    tracing::info!("txtserve v{}", txtserve::VERSION);
    tracing::info!("Root directory: {}", args.root.display());
    tracing::info!("Listen address: {}", listen_addr);

    let config = Config::builder()
        .root_dir(&args.root)
        .listen_addr(listen_addr)
        .max_connections(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .list_limit(args.list_limit)
        .build();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received stop signal, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::error!("Failed to install signal handler: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}
