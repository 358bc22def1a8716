//! Collaborative quiz room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizroom-server -- \
//!     --quizzes packages/server/fixtures/quizzes.json \
//!     --users packages/server/fixtures/users.json \
//!     --room R1=Q1
//! ```

use std::sync::Arc;

use clap::Parser;
use quizroom_server::{
    domain::{DEFAULT_PARTICIPANT_CAPACITY, QuizId, RoomId},
    infrastructure::{identity::StaticTokenIdentityProvider, quiz_store::InMemoryQuizStore},
    ui::{AppState, Server},
};
use quizroom_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "quizroom-server")]
#[command(about = "Collaborative quiz room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// JSON file with the quizzes to serve
    #[arg(long, default_value = "packages/server/fixtures/quizzes.json")]
    quizzes: String,

    /// JSON file mapping bearer tokens to users
    #[arg(long, default_value = "packages/server/fixtures/users.json")]
    users: String,

    /// Room to create at startup, as ROOM_ID=QUIZ_ID (repeatable)
    #[arg(long = "room", value_parser = parse_room)]
    rooms: Vec<(RoomId, QuizId)>,

    /// Maximum number of participants per room
    #[arg(long, default_value_t = DEFAULT_PARTICIPANT_CAPACITY)]
    room_capacity: usize,
}

fn parse_room(value: &str) -> Result<(RoomId, QuizId), String> {
    let (room, quiz) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ROOM_ID=QUIZ_ID, got '{}'", value))?;
    let room_id = RoomId::new(room.to_string()).map_err(|e| e.to_string())?;
    let quiz_id = QuizId::new(quiz.to_string()).map_err(|e| e.to_string())?;
    Ok((room_id, quiz_id))
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // 1. External collaborators
    let quiz_store = Arc::new(InMemoryQuizStore::from_json_file(&args.quizzes).await?);
    let identities = Arc::new(StaticTokenIdentityProvider::from_json_file(&args.users).await?);

    // 2. Use cases
    let state = AppState::in_memory(
        quiz_store,
        identities,
        Arc::new(SystemClock),
        args.room_capacity,
    );

    // 3. Preconfigured rooms (first joiner hosts)
    for (room_id, quiz_id) in args.rooms {
        state
            .create_room_usecase
            .execute(None, quiz_id, Some(room_id))
            .await?;
    }

    // 4. Server
    Server::new(state).run(args.host, args.port).await
}
