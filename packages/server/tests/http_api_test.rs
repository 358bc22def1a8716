//! Integration tests for the HTTP API, served in-process on an ephemeral port.

use std::{net::SocketAddr, sync::Arc};

use quizroom_server::{
    infrastructure::{
        dto::{
            http::{CreateRoomResponse, ErrorResponse, RoomDetailDto, RoomSummaryDto},
            websocket::{QuizSummaryDto, RoomStatusDto},
        },
        identity::StaticTokenIdentityProvider,
        quiz_store::InMemoryQuizStore,
    },
    ui::{AppState, Server},
};
use quizroom_shared::time::FixedClock;
use reqwest::StatusCode;
use serde_json::json;

const QUIZZES: &str = r#"[
    {"id": "Q1", "title": "Capitals", "questions": [
        {"text": "Capital of France?", "options": ["Lyon", "Paris"], "correctAnswer": 1}
    ]},
    {"id": "Q2", "title": "Empty", "questions": []}
]"#;

const USERS: &str = r#"[{"token": "token-p1", "id": "P1", "displayName": "Player One"}]"#;

struct TestServer {
    addr: SocketAddr,
    http: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::in_memory(
            Arc::new(InMemoryQuizStore::from_json(QUIZZES).unwrap()),
            Arc::new(StaticTokenIdentityProvider::from_json(USERS).unwrap()),
            Arc::new(FixedClock::new(0)),
            32,
        );
        let router = Server::new(state).router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn create_room(&self, body: serde_json::Value) -> reqwest::Response {
        self.http
            .post(self.url("/api/rooms"))
            .bearer_auth("token-p1")
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    // given:
    let server = TestServer::start().await;

    // when:
    let response = server.http.get(server.url("/api/health")).send().await.unwrap();

    // then:
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_quiz_catalog_requires_token() {
    // given:
    let server = TestServer::start().await;

    // when:
    let anonymous = server.http.get(server.url("/api/quizzes")).send().await.unwrap();
    let authorized = server
        .http
        .get(server.url("/api/quizzes"))
        .bearer_auth("token-p1")
        .send()
        .await
        .unwrap();

    // then:
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(authorized.status(), StatusCode::OK);
    let quizzes: Vec<QuizSummaryDto> = authorized.json().await.unwrap();
    assert_eq!(
        quizzes,
        vec![
            QuizSummaryDto {
                id: "Q1".to_string(),
                title: "Capitals".to_string(),
                question_count: 1,
            },
            QuizSummaryDto {
                id: "Q2".to_string(),
                title: "Empty".to_string(),
                question_count: 0,
            },
        ]
    );
}

#[tokio::test]
async fn test_create_and_inspect_room() {
    // given:
    let server = TestServer::start().await;

    // when:
    let created = server.create_room(json!({"quizId": "Q1", "roomId": "R1"})).await;

    // then:
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: CreateRoomResponse = created.json().await.unwrap();
    assert_eq!(body.room_id, "R1");

    let rooms: Vec<RoomSummaryDto> = server
        .http
        .get(server.url("/api/rooms"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R1");
    assert_eq!(rooms[0].quiz_id, "Q1");
    assert_eq!(rooms[0].status, RoomStatusDto::Waiting);
    assert!(rooms[0].participants.is_empty());
    assert_eq!(rooms[0].created_at, "1970-01-01T00:00:00.000Z");

    let detail: RoomDetailDto = server
        .http
        .get(server.url("/api/rooms/R1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.host.as_deref(), Some("P1"));
    assert_eq!(detail.group_score, 0);
    assert_eq!(detail.question_number, None);
}

#[tokio::test]
async fn test_create_room_generates_id_when_omitted() {
    // given:
    let server = TestServer::start().await;

    // when:
    let created = server.create_room(json!({"quizId": "Q2"})).await;

    // then:
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: CreateRoomResponse = created.json().await.unwrap();
    assert!(!body.room_id.is_empty());
}

#[tokio::test]
async fn test_create_room_errors() {
    // given:
    let server = TestServer::start().await;
    server.create_room(json!({"quizId": "Q1", "roomId": "R1"})).await;

    // when:
    let duplicate = server.create_room(json!({"quizId": "Q1", "roomId": "R1"})).await;
    let unknown_quiz = server.create_room(json!({"quizId": "nope"})).await;
    let bad_room_id = server
        .create_room(json!({"quizId": "Q1", "roomId": "not a valid id"}))
        .await;
    let anonymous = server
        .http
        .post(server.url("/api/rooms"))
        .json(&json!({"quizId": "Q1"}))
        .send()
        .await
        .unwrap();

    // then:
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(unknown_quiz.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = unknown_quiz.json().await.unwrap();
    assert!(error.error.contains("nope"));
    assert_eq!(bad_room_id.status(), StatusCode::BAD_REQUEST);
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_room_detail_not_found() {
    // given:
    let server = TestServer::start().await;

    // when:
    let response = server
        .http
        .get(server.url("/api/rooms/missing"))
        .send()
        .await
        .unwrap();

    // then:
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
