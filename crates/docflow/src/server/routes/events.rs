//! Object-created notification webhook

use axum::{extract::State, http::StatusCode, Json};

use crate::processing::handle_event;
use crate::server::state::AppState;
use crate::types::{EventResponse, EventStatus, ObjectCreatedEvent};

/// POST /events - process one object-created notification.
///
/// Always answers with a structured status; processing errors surface as a
/// `failed` body with a 500, never as an unhandled error.
pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<ObjectCreatedEvent>,
) -> (StatusCode, Json<EventResponse>) {
    let response = handle_event(&state, event).await;

    let status = match response.status {
        EventStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };

    (status, Json(response))
}
