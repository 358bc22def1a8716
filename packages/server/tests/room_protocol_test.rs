//! End-to-end tests of the room protocol over a real websocket.
//!
//! Each test starts the axum router on an ephemeral port and talks to it with
//! tokio-tungstenite clients authenticated by bearer tokens.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use quizroom_server::{
    domain::{QuizId, RoomId},
    infrastructure::{
        dto::websocket::{ClientCommand, RoomStatusDto, ServerEvent, StrokeDto},
        identity::StaticTokenIdentityProvider,
        quiz_store::InMemoryQuizStore,
    },
    ui::{AppState, Server},
};
use quizroom_shared::time::FixedClock;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const QUIZZES: &str = r#"[
    {"id": "Q1", "title": "Two questions", "questions": [
        {"text": "First?", "options": ["A", "B", "C", "D"], "correctAnswer": 1},
        {"text": "Second?", "options": ["A", "B", "C", "D"], "correctAnswer": 2}
    ]}
]"#;

const USERS: &str = r#"[
    {"token": "token-p1", "id": "P1", "displayName": "Player One"},
    {"token": "token-p2", "id": "P2", "displayName": "Player Two"},
    {"token": "token-p3", "id": "P3", "displayName": "Player Three"}
]"#;

async fn spawn_server() -> SocketAddr {
    let quiz_store = Arc::new(InMemoryQuizStore::from_json(QUIZZES).unwrap());
    let identities = Arc::new(StaticTokenIdentityProvider::from_json(USERS).unwrap());
    let state = AppState::in_memory(
        quiz_store,
        identities,
        Arc::new(FixedClock::new(1_700_000_000_000)),
        32,
    );
    state
        .create_room_usecase
        .execute(
            None,
            QuizId::new("Q1".to_string()).unwrap(),
            Some(RoomId::new("R1".to_string()).unwrap()),
        )
        .await
        .unwrap();

    let router = Server::new(state).router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, token: &str) -> Ws {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request.headers_mut().insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    let (ws, _) = connect_async(request).await.unwrap();
    ws
}

async fn send(ws: &mut Ws, command: ClientCommand) {
    let frame = serde_json::to_string(&command).unwrap();
    ws.send(Message::Text(frame.into())).await.unwrap();
}

async fn recv(ws: &mut Ws) -> ServerEvent {
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn join(ws: &mut Ws, room: &str) -> ServerEvent {
    send(
        ws,
        ClientCommand::JoinRoom {
            room_id: room.to_string(),
        },
    )
    .await;
    recv(ws).await
}

fn stroke(x: f64) -> StrokeDto {
    StrokeDto {
        x0: x,
        y0: 0.0,
        x1: x + 1.0,
        y1: 1.0,
        color: "#112233".to_string(),
        brush_size: 4.0,
        is_erasing: false,
    }
}

#[tokio::test]
async fn test_upgrade_without_valid_token_is_refused() {
    // given:
    let addr = spawn_server().await;

    // when: no Authorization header at all
    let anonymous = connect_async(format!("ws://{addr}/ws")).await;

    // then:
    match anonymous {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected 401, got {:?}", other.map(|_| ())),
    }

    // when: unknown token
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
    let unknown = connect_async(request).await;

    // then:
    assert!(matches!(
        unknown,
        Err(tungstenite::Error::Http(response)) if response.status() == 401
    ));
}

#[tokio::test]
async fn test_full_quiz_scenario() {
    // given: P1 and P2 in room R1
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;
    let mut p2 = connect(addr, "token-p2").await;

    let ServerEvent::RoomJoined { room } = join(&mut p1, "R1").await else {
        panic!("expected room_joined");
    };
    assert_eq!(room.status, RoomStatusDto::Waiting);
    assert_eq!(room.host.as_deref(), Some("P1"));
    assert_eq!(room.quiz.question_count, 2);

    assert!(matches!(join(&mut p2, "R1").await, ServerEvent::RoomJoined { .. }));
    assert!(matches!(
        recv(&mut p1).await,
        ServerEvent::PlayerJoined { players } if players.len() == 2
    ));

    // when / then: question 1
    send(&mut p1, ClientCommand::NextQuestion {}).await;
    for ws in [&mut p1, &mut p2] {
        assert!(matches!(
            recv(ws).await,
            ServerEvent::NewQuestion { question_number: 1, question } if question.text == "First?"
        ));
    }

    send(&mut p1, ClientCommand::SuggestAnswer { answer: 1 }).await;
    for ws in [&mut p1, &mut p2] {
        assert!(matches!(
            recv(ws).await,
            ServerEvent::NewSuggestion { suggestion } if suggestion.participant.id == "P1" && suggestion.answer == 1
        ));
    }

    send(&mut p2, ClientCommand::VoteAnswer { answer: 1 }).await;
    for ws in [&mut p1, &mut p2] {
        assert_eq!(
            recv(ws).await,
            ServerEvent::VoteUpdate {
                answer: 1,
                votes: 1
            }
        );
    }

    send(&mut p1, ClientCommand::ResolveQuestion {}).await;
    for ws in [&mut p1, &mut p2] {
        assert_eq!(
            recv(ws).await,
            ServerEvent::QuestionResult {
                winning_answer: Some(1),
                correct_answer: 1,
                is_correct: true,
                group_score: 1,
            }
        );
    }

    // when / then: question 2, final
    send(&mut p1, ClientCommand::NextQuestion {}).await;
    for ws in [&mut p1, &mut p2] {
        assert!(matches!(
            recv(ws).await,
            ServerEvent::NewQuestion { question_number: 2, .. }
        ));
    }

    send(&mut p2, ClientCommand::SuggestAnswer { answer: 2 }).await;
    for ws in [&mut p1, &mut p2] {
        assert!(matches!(recv(ws).await, ServerEvent::NewSuggestion { .. }));
    }

    send(&mut p1, ClientCommand::ResolveQuestion {}).await;
    for ws in [&mut p1, &mut p2] {
        assert_eq!(
            recv(ws).await,
            ServerEvent::QuestionResult {
                winning_answer: Some(2),
                correct_answer: 2,
                is_correct: true,
                group_score: 2,
            }
        );
        assert_eq!(
            recv(ws).await,
            ServerEvent::QuizFinished {
                group_score: 2,
                total_questions: 2,
            }
        );
    }

    // then: the finished room rejects further play, the connection stays open
    send(&mut p1, ClientCommand::NextQuestion {}).await;
    assert_eq!(
        recv(&mut p1).await,
        ServerEvent::Error {
            message: "The quiz has already finished".to_string()
        }
    );
    send(&mut p2, ClientCommand::VoteAnswer { answer: 2 }).await;
    assert!(matches!(recv(&mut p2).await, ServerEvent::Error { .. }));
}

#[tokio::test]
async fn test_protocol_errors_keep_connection_open() {
    // given:
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;

    // when / then: unknown room
    assert_eq!(
        join(&mut p1, "nowhere").await,
        ServerEvent::Error {
            message: "Room 'nowhere' does not exist".to_string()
        }
    );

    // when / then: command before joining
    send(&mut p1, ClientCommand::SuggestAnswer { answer: 0 }).await;
    assert_eq!(
        recv(&mut p1).await,
        ServerEvent::Error {
            message: "You have not joined this room".to_string()
        }
    );

    // when / then: malformed frame
    p1.send(Message::Text("{not json".into())).await.unwrap();
    assert!(matches!(
        recv(&mut p1).await,
        ServerEvent::Error { message } if message.starts_with("Invalid message")
    ));

    // then: still usable
    assert!(matches!(join(&mut p1, "R1").await, ServerEvent::RoomJoined { .. }));
}

#[tokio::test]
async fn test_duplicate_suggestion_and_self_vote_are_rejected() {
    // given:
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;
    join(&mut p1, "R1").await;
    send(&mut p1, ClientCommand::NextQuestion {}).await;
    recv(&mut p1).await;
    send(&mut p1, ClientCommand::SuggestAnswer { answer: 0 }).await;
    recv(&mut p1).await;

    // when / then:
    send(&mut p1, ClientCommand::SuggestAnswer { answer: 3 }).await;
    assert_eq!(
        recv(&mut p1).await,
        ServerEvent::Error {
            message: "You already suggested an answer for this question".to_string()
        }
    );
    send(&mut p1, ClientCommand::VoteAnswer { answer: 0 }).await;
    assert_eq!(
        recv(&mut p1).await,
        ServerEvent::Error {
            message: "You cannot vote for your own suggestion".to_string()
        }
    );
}

#[tokio::test]
async fn test_whiteboard_relay_and_late_joiner() {
    // given:
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;
    let mut p2 = connect(addr, "token-p2").await;
    join(&mut p1, "R1").await;
    join(&mut p2, "R1").await;
    recv(&mut p1).await; // player_joined

    // when: P1 draws, then clears
    send(&mut p1, ClientCommand::WhiteboardDraw(stroke(0.0))).await;
    send(&mut p1, ClientCommand::WhiteboardClear {}).await;

    // then: P2 sees the stroke and the clear; P1 only the clear
    assert_eq!(recv(&mut p2).await, ServerEvent::WhiteboardDraw(stroke(0.0)));
    assert_eq!(recv(&mut p2).await, ServerEvent::WhiteboardClear {});
    assert_eq!(recv(&mut p1).await, ServerEvent::WhiteboardClear {});

    // when: P3 joins late and P2 draws a new stroke
    let mut p3 = connect(addr, "token-p3").await;
    assert!(matches!(join(&mut p3, "R1").await, ServerEvent::RoomJoined { .. }));
    recv(&mut p1).await; // player_joined
    recv(&mut p2).await; // player_joined
    send(&mut p2, ClientCommand::WhiteboardDraw(stroke(5.0))).await;

    // then: P3 receives exactly the stroke drawn after joining
    assert_eq!(recv(&mut p3).await, ServerEvent::WhiteboardDraw(stroke(5.0)));
    assert_eq!(recv(&mut p1).await, ServerEvent::WhiteboardDraw(stroke(5.0)));
}

#[tokio::test]
async fn test_chat_reaches_everyone_including_sender() {
    // given:
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;
    let mut p2 = connect(addr, "token-p2").await;
    join(&mut p1, "R1").await;
    join(&mut p2, "R1").await;
    recv(&mut p1).await; // player_joined

    // when:
    send(
        &mut p2,
        ClientCommand::ChatMessage {
            message: "hello".to_string(),
        },
    )
    .await;

    // then:
    for ws in [&mut p1, &mut p2] {
        assert_eq!(
            recv(ws).await,
            ServerEvent::ChatMessage {
                player_name: "Player Two".to_string(),
                message: "hello".to_string(),
                timestamp: 1_700_000_000_000,
            }
        );
    }
}

#[tokio::test]
async fn test_disconnect_broadcasts_player_left() {
    // given:
    let addr = spawn_server().await;
    let mut p1 = connect(addr, "token-p1").await;
    let mut p2 = connect(addr, "token-p2").await;
    join(&mut p1, "R1").await;
    join(&mut p2, "R1").await;
    recv(&mut p1).await; // player_joined

    // when:
    p2.close(None).await.unwrap();

    // then:
    match recv(&mut p1).await {
        ServerEvent::PlayerLeft { players } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].id, "P1");
        }
        other => panic!("expected player_left, got {:?}", other),
    }
}
