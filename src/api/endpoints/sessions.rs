//! Session lifecycle endpoints.
//!
//! Sessions are the unit of isolation: each owns one regimen, one
//! transcript, and one view state, and is destroyed without a trace.
//! These routes sit outside the session-resolution middleware since
//! they manage sessions rather than operate inside one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

/// `POST /api/sessions` — create an isolated session.
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<Json<SessionCreatedResponse>, ApiError> {
    let session = ctx.registry.create()?;
    Ok(Json(SessionCreatedResponse {
        session_id: session.id,
    }))
}

/// `DELETE /api/sessions/{id}` — destroy a session and everything in it.
pub async fn destroy(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.registry.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
