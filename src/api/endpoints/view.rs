//! View-mode endpoints.
//!
//! The interface shows either the chat panel or the data tables at any
//! given moment. The mode is presentation state only; flipping it never
//! touches the regimen or the transcript.

use std::sync::Arc;

use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::session::SessionContext;
use crate::view::ViewMode;

#[derive(Serialize, Deserialize)]
pub struct ViewModeBody {
    pub mode: ViewMode,
}

/// `GET /api/view` — the session's current view mode.
pub async fn mode(
    Extension(session): Extension<Arc<SessionContext>>,
) -> Result<Json<ViewModeBody>, ApiError> {
    let guard = session.state.lock().await;
    Ok(Json(ViewModeBody {
        mode: guard.view.mode(),
    }))
}

/// `PUT /api/view` — switch between chat and data views.
pub async fn set_mode(
    Extension(session): Extension<Arc<SessionContext>>,
    Json(body): Json<ViewModeBody>,
) -> Result<Json<ViewModeBody>, ApiError> {
    let mut guard = session.state.lock().await;
    guard.view.set_mode(body.mode);
    Ok(Json(ViewModeBody {
        mode: guard.view.mode(),
    }))
}
