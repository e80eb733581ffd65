//! Peerlink signaling server.
//!
//! Cameras and monitors connect to `/ws/{roomId}` and exchange WebRTC
//! negotiation events through this server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin peerlink-server
//! cargo run --bin peerlink-server -- --host 127.0.0.1 --port 3000 --allow-origin http://localhost:5173
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use peerlink_server::{
    infrastructure::repository::InMemoryRoomRepository,
    ui::{AppState, Server},
};
use peerlink_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "peerlink-server", version)]
#[command(about = "Camera / monitor signaling relay over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 11100)]
    port: u16,

    /// Allowed CORS origin (`*` for any)
    #[arg(long, env = "ALLOW_ORIGIN", default_value = "*")]
    allow_origin: String,

    /// Directory of a web client build to serve for unmatched paths
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Clock + Repository
    // 2. UseCases (AppState)
    // 3. Server
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository = Arc::new(InMemoryRoomRepository::new(clock.clone()));
    let state = AppState::new(repository, clock);

    let server = Server::new(state)
        .with_allow_origin(args.allow_origin)
        .with_static_dir(args.static_dir);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
