//! txtclient CLI
//!
//! Fetches a file, its size, or the listing from a txtserve server.
//!
//! ```text
//! txtclient <host> <port> <name>          # file bytes to stdout
//! txtclient --head <host> <port> <name>   # SIZE <n> bytes
//! txtclient --list <host> <port>          # <name>\t<size> per line
//! ```

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use txtserve::{Client, Result};

/// txtclient
#[derive(Parser, Debug)]
#[command(name = "txtclient")]
#[command(about = "Client for the txtserve file server")]
#[command(version)]
struct Args {
    /// Print only the size of the file
    #[arg(long, conflicts_with = "list")]
    head: bool,

    /// List the files the server exposes
    #[arg(long)]
    list: bool,

    /// Server host
    host: String,

    /// Server port
    port: u16,

    /// File to fetch
    #[arg(required_unless_present = "list", conflicts_with = "list")]
    name: Option<String>,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the payload
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("txtclient: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let client = Client::connect((args.host.as_str(), args.port), timeout)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list {
        for entry in client.list()? {
            out.write_all(&entry.name)?;
            writeln!(out, "\t{}", entry.size)?;
        }
        return Ok(());
    }

    // clap guarantees a name unless --list
    let name = args.name.as_deref().unwrap_or_default();
    if args.head {
        let size = client.head(name)?;
        writeln!(out, "SIZE {} bytes", size)?;
    } else {
        client.get_to(name, &mut out)?;
    }
    Ok(())
}
