//! REST endpoints for driving conversations over HTTP.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::SessionManager;

/// Shared state for the session routes.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<SessionManager>,
}

/// Build the REST router.
pub fn session_routes(manager: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/turns", post(post_turn))
        .with_state(ApiState { manager })
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "pizzabot"
    }))
}

/// POST /api/sessions
///
/// Opens a conversation and returns its id with the greeting.
async fn create_session(State(state): State<ApiState>) -> impl IntoResponse {
    let greeting = state.manager.start().await;
    (StatusCode::CREATED, Json(json!(greeting)))
}

/// GET /api/sessions/{id}
async fn get_session(State(state): State<ApiState>, Path(id): Path<String>) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.manager.snapshot(id).await {
        Ok(session) => (StatusCode::OK, Json(json!(session))),
        Err(e) => session_error(&e),
    }
}

/// DELETE /api/sessions/{id}
///
/// Abandons the conversation.
async fn delete_session(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if state.manager.abandon(id).await {
        (StatusCode::OK, Json(json!({"status": "abandoned"})))
    } else {
        session_error(&SessionError::NotFound { id })
    }
}

#[derive(Deserialize)]
struct TurnRequest {
    text: String,
}

/// POST /api/sessions/{id}/turns
///
/// Runs one dialogue turn with the user's text, trimmed like a CLI line.
async fn post_turn(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(body): Json<TurnRequest>,
) -> impl IntoResponse {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.manager.handle_turn(id, body.text.trim()).await {
        Ok(turn) => (StatusCode::OK, Json(json!(turn))),
        Err(e) => session_error(&e),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, (StatusCode, Json<Value>)> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid session ID"})),
        )
    })
}

fn session_error(error: &SessionError) -> (StatusCode, Json<Value>) {
    let status = match error {
        SessionError::NotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::Ended { .. } => StatusCode::CONFLICT,
    };
    (status, Json(json!({"error": error.to_string()})))
}
