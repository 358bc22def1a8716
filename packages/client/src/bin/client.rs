//! Terminal client for collaborative quiz rooms.
//!
//! Connects to the room server with a bearer token, then reads commands from
//! stdin (`/join R1`, `/suggest 2`, `/vote 2`, ...; plain text is chat).
//! Lost connections are retried a bounded number of times.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizroom-client -- --token token-alice
//! cargo run --bin quizroom-client -- -t token-bob -u ws://127.0.0.1:8080/ws
//! ```

use std::time::Duration;

use clap::Parser;

use quizroom_client::{ClientConfig, connection::ConnectOptions, run_client};
use quizroom_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "quizroom-client")]
#[command(about = "Terminal client for collaborative quiz rooms", long_about = None)]
struct Args {
    /// Bearer token identifying the player
    #[arg(short = 't', long)]
    token: String,

    /// WebSocket endpoint of the room server
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Base URL of the HTTP API
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    api_url: String,

    #[arg(long, default_value_t = 5)]
    max_reconnect_attempts: u32,

    #[arg(long, default_value_t = 5)]
    reconnect_delay_secs: u64,

    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// How long an unused connection is kept open
    #[arg(long, default_value_t = 3000)]
    grace_period_ms: u64,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            token: args.token,
            api_url: args.api_url,
            connect: ConnectOptions {
                url: args.url,
                max_reconnect_attempts: args.max_reconnect_attempts,
                reconnect_delay: Duration::from_secs(args.reconnect_delay_secs),
                connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            },
            grace_period: Duration::from_millis(args.grace_period_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(args.into()).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
