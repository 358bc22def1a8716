//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};

use crate::{
    domain::{AuthError, Identity, QuizId, RoomId},
    infrastructure::dto::{
        http::{
            CreateRoomRequest, CreateRoomResponse, ErrorResponse, RoomDetailDto, RoomSummaryDto,
        },
        websocket::QuizSummaryDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, GetRoomDetailError},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    state
        .authenticate_usecase
        .execute(authorization)
        .await
        .map_err(|e| match e {
            AuthError::LoadFailed(_) => {
                tracing::error!("Identity provider failure: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AuthError::MissingToken | AuthError::InvalidToken => {
                api_error(StatusCode::UNAUTHORIZED, e.to_string())
            }
        })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Quiz catalog (bearer auth)
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<QuizSummaryDto>>, ApiError> {
    authenticate(&state, &headers).await?;

    let quizzes = state.list_quizzes_usecase.execute().await.map_err(|e| {
        tracing::error!("Failed to list quizzes: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(quizzes.iter().map(Into::into).collect()))
}

/// Create a room; the caller becomes its host (bearer auth)
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let identity = authenticate(&state, &headers).await?;

    let quiz_id = QuizId::new(request.quiz_id)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let room_id = request
        .room_id
        .map(RoomId::new)
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    match state
        .create_room_usecase
        .execute(Some(identity.id), quiz_id, room_id)
        .await
    {
        Ok(room_id) => Ok((
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                room_id: room_id.into_string(),
            }),
        )),
        Err(e @ CreateRoomError::QuizNotFound(_)) => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e @ CreateRoomError::DuplicateRoom(_)) => {
            Err(api_error(StatusCode::CONFLICT, e.to_string()))
        }
        Err(e @ CreateRoomError::QuizStoreUnavailable(_)) => {
            tracing::error!("Failed to create room: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.iter().map(Into::into).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(room) => Ok(Json((&room).into())),
        Err(e @ GetRoomDetailError::RoomNotFound) => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e @ GetRoomDetailError::InvalidRoomId) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}
