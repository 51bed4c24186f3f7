//! HTTP request handlers

use super::types::{
    ContactRequest, ErrorResponse, HealthResponse, RelayRequest, RelayResponse, VersionResponse,
};
use super::AppState;
use crate::dialogue::{submit_contact, TurnInput, TurnOutput};
use crate::relay::RelayOutcome;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Scripted intake flow
        .route("/api/agent", post(scripted_turn))
        .route("/api/contact", post(contact_step))
        // Local model relay
        .route("/api/pro", post(relay_turn))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Scripted Turns
// ============================================================

/// Malformed requests still get a turn back, never an error status
async fn scripted_turn(payload: Result<Json<TurnInput>, JsonRejection>) -> Json<TurnOutput> {
    match payload {
        Ok(Json(input)) => {
            let output = input.run();
            tracing::debug!(
                state = %input.state,
                next_state = %output.next_state,
                "Scripted turn"
            );
            Json(output)
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Malformed turn request");
            Json(TurnOutput::fallback())
        }
    }
}

async fn contact_step(
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<TurnOutput>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(submit_contact(&req.slots, &req.raw)))
}

// ============================================================
// Relayed Turns
// ============================================================

async fn relay_turn(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> (StatusCode, Json<RelayResponse>) {
    // Unreadable bodies relay as empty text
    let req = payload.map(|Json(req)| req).unwrap_or_default();

    match state.relay.relay(&req.user_text).await {
        RelayOutcome::Replied { reply } => (StatusCode::OK, Json(RelayResponse::replied(reply))),
        RelayOutcome::Failed { error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RelayResponse::failed(error)),
        ),
    }
}

// ============================================================
// Service Info
// ============================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        model: state.relay.model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
