//! CarRace daemon - serves the cached car roster over TCP
//!
//! Clients send one JSON request per line and get one JSON response
//! per line back. The roster is seeded at startup; the cache
//! connection is built once and shared by every connection.

mod handler;
mod protocol;

use std::sync::Arc;

use anyhow::Result;
use carcache::{CacheConn, CacheManager};
use carstore::{CarStore, RandomScores, ScoreSource};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::handler::Dispatcher;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:7600")]
    bind: String,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    // Health check
    if args.health {
        match TcpStream::connect(&args.bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting CarRace daemon v{}", env!("CARGO_PKG_VERSION"));

    // Seed the roster, build the one shared cache connection
    let mut scores = RandomScores;
    let store = Arc::new(CarStore::seeded(&mut scores));
    let manager = CacheManager::new(CacheConn::new());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&store),
        manager,
        Box::new(scores) as Box<dyn ScoreSource>,
    ));
    info!("Roster seeded with {} cars", store.len());

    let listener = TcpListener::bind(&args.bind).await?;
    info!("Server listening on {}", args.bind);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let dispatcher = Arc::clone(&dispatcher);

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, dispatcher).await {
                        error!("Error handling client {}: {}", addr, e);
                    }
                    info!("Connection closed: {}", addr);
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatcher.handle_line(&line);
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
    }

    Ok(())
}
