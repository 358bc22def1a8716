//! Interactive CLI session on top of the connection multiplexer.

use std::sync::Arc;

use quizroom_server::infrastructure::dto::websocket::{ClientCommand, ServerEvent, StrokeDto};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{Mutex, broadcast, mpsc};

use crate::{
    canvas::Canvas,
    catalog::QuizCatalogCache,
    connection::{ConnectOptions, ConnectionHandle, ConnectionManager, TransportState},
    error::ClientError,
    formatter::MessageFormatter,
    room_view::RoomView,
    ui::{PROMPT, print_above_prompt},
};

const COMPONENT_ID: &str = "cli-session";
const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_BRUSH_SIZE: f64 = 4.0;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Quizzes,
    Status,
    Help,
    Quit,
    /// Sent to the room; the answer indices are already zero-based
    Command(ClientCommand),
}

/// Parse a line of user input.
///
/// Lines starting with `/` are commands; anything else is chat.
pub fn parse_input(line: &str) -> Result<Input, ClientError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Input::Command(ClientCommand::ChatMessage {
            message: line.to_string(),
        }));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let input = match (name, args.as_slice()) {
        ("quizzes", []) => Input::Quizzes,
        ("status", []) => Input::Status,
        ("help", []) => Input::Help,
        ("quit" | "exit", []) => Input::Quit,
        ("join", [room]) => Input::Command(ClientCommand::JoinRoom {
            room_id: room.to_string(),
        }),
        ("leave", []) => Input::Command(ClientCommand::LeaveRoom {}),
        ("next", []) => Input::Command(ClientCommand::NextQuestion {}),
        ("resolve", []) => Input::Command(ClientCommand::ResolveQuestion {}),
        ("suggest", [n]) => Input::Command(ClientCommand::SuggestAnswer {
            answer: parse_option(n)?,
        }),
        ("vote", [n]) => Input::Command(ClientCommand::VoteAnswer {
            answer: parse_option(n)?,
        }),
        ("draw", [x0, y0, x1, y1, extra @ ..]) if extra.len() <= 2 => {
            let color = extra.first().copied().unwrap_or(DEFAULT_COLOR);
            let size = extra.get(1).map(|s| parse_number(s)).transpose()?;
            Input::Command(ClientCommand::WhiteboardDraw(stroke(
                [x0, y0, x1, y1],
                color,
                size,
                false,
            )?))
        }
        ("erase", [x0, y0, x1, y1, extra @ ..]) if extra.len() <= 1 => {
            let size = extra.first().map(|s| parse_number(s)).transpose()?;
            Input::Command(ClientCommand::WhiteboardDraw(stroke(
                [x0, y0, x1, y1],
                DEFAULT_COLOR,
                size,
                true,
            )?))
        }
        ("clear", []) => Input::Command(ClientCommand::WhiteboardClear {}),
        _ => {
            return Err(ClientError::InvalidInput(format!(
                "Unknown command '/{}'. Type /help for the list of commands.",
                rest
            )));
        }
    };
    Ok(input)
}

/// One-based option number typed by the user to a zero-based index
fn parse_option(word: &str) -> Result<usize, ClientError> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ClientError::InvalidInput(format!(
            "'{}' is not an option number",
            word
        ))),
    }
}

fn parse_number(word: &str) -> Result<f64, ClientError> {
    word.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ClientError::InvalidInput(format!("'{}' is not a number", word)))
}

fn stroke(
    coordinates: [&&str; 4],
    color: &str,
    brush_size: Option<f64>,
    is_erasing: bool,
) -> Result<StrokeDto, ClientError> {
    let [x0, y0, x1, y1] = coordinates;
    Ok(StrokeDto {
        x0: parse_number(x0)?,
        y0: parse_number(y0)?,
        x1: parse_number(x1)?,
        y1: parse_number(y1)?,
        color: color.to_string(),
        brush_size: brush_size.unwrap_or(DEFAULT_BRUSH_SIZE),
        is_erasing,
    })
}

/// Local state shared by the reader task and the input loop
#[derive(Default)]
struct LocalState {
    view: RoomView,
    canvas: Canvas,
}

/// Run an interactive session until the user quits or the connection is lost.
pub async fn run_session(
    manager: &ConnectionManager,
    catalog: &QuizCatalogCache,
    token: &str,
    options: ConnectOptions,
) -> Result<(), ClientError> {
    let handle = manager
        .acquire(token, options)
        .await
        .ok_or(ClientError::Unauthorized)?;
    manager.register_user(COMPONENT_ID).await;

    let result = drive(&handle, catalog, token).await;

    manager.unregister_user(COMPONENT_ID).await;
    result
}

async fn drive(
    handle: &ConnectionHandle,
    catalog: &QuizCatalogCache,
    token: &str,
) -> Result<(), ClientError> {
    let local = Arc::new(Mutex::new(LocalState::default()));

    let mut read_task = tokio::spawn(read_events(
        handle.subscribe(),
        local.clone(),
        handle.clone(),
    ));

    let mut state = handle.watch_state();
    let mut lost = Box::pin(async move {
        let _ = state
            .wait_for(|state| *state == TransportState::Disconnected)
            .await;
    });

    println!("\nType /help for commands. Plain text is sent as chat. Press Ctrl+D to exit.\n");
    let mut input_rx = spawn_readline();

    loop {
        tokio::select! {
            _ = &mut lost => {
                read_task.abort();
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            _ = &mut read_task => {
                return Err(ClientError::Closed);
            }
            line = input_rx.recv() => {
                let Some(line) = line else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => print_above_prompt(&MessageFormatter::format_help()),
                    Ok(Input::Quizzes) => {
                        let quizzes = catalog.get(Some(token)).await;
                        print_above_prompt(&MessageFormatter::format_catalog(&quizzes));
                    }
                    Ok(Input::Status) => {
                        let local = local.lock().await;
                        print_above_prompt(&MessageFormatter::format_status(
                            &local.view,
                            local.canvas.segments().len(),
                        ));
                    }
                    Ok(Input::Command(command)) => {
                        record_locally(&local, &command).await;
                        if let Err(e) = handle.send(command) {
                            tracing::warn!("Failed to send command: {}", e);
                            print_above_prompt(&format!("\n! {}\n", e));
                        }
                    }
                    Err(e) => print_above_prompt(&format!("\n! {}\n", e)),
                }
            }
        }
    }

    read_task.abort();
    Ok(())
}

/// Apply the parts of an outgoing command the server will not echo back.
async fn record_locally(local: &Mutex<LocalState>, command: &ClientCommand) {
    let mut local = local.lock().await;
    match command {
        // Strokes are relayed to everyone but the sender.
        ClientCommand::WhiteboardDraw(stroke) => local.canvas.draw(stroke),
        ClientCommand::SuggestAnswer { answer } => local.view.record_suggestion(*answer),
        ClientCommand::VoteAnswer { answer } => local.view.record_vote(*answer),
        ClientCommand::LeaveRoom {} => {
            local.view.reset();
            local.canvas.clear();
        }
        _ => {}
    }
}

/// The command that brings a view back in sync after events were dropped.
///
/// Rejoining the current room answers with a full `room_joined` snapshot.
fn resync_command(view: &RoomView) -> Option<ClientCommand> {
    view.room_id.clone().map(|room_id| ClientCommand::JoinRoom { room_id })
}

async fn read_events(
    mut events: broadcast::Receiver<ServerEvent>,
    local: Arc<Mutex<LocalState>>,
    handle: ConnectionHandle,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                {
                    let mut local = local.lock().await;
                    if matches!(event, ServerEvent::RoomJoined { .. }) {
                        local.canvas.clear();
                    }
                    local.view.apply(&event);
                    local.canvas.apply(&event);
                }
                print_above_prompt(&MessageFormatter::format_event(&event));
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Display fell behind, skipped {} events", skipped);
                let Some(command) = resync_command(&local.lock().await.view) else {
                    continue;
                };
                if let Err(e) = handle.send(command) {
                    tracing::warn!("Failed to resync room: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Read lines on a blocking thread and forward them over a channel
fn spawn_readline() -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
