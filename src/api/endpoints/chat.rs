//! Chat endpoints.
//!
//! `POST /api/chat` appends the user's message to the transcript, asks
//! the model for a reply, and appends that too. If the model call fails
//! the user's entry stays and the failure surfaces as an error notice,
//! so the transcript stays append-only either way.

use std::sync::Arc;

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::models::ChatEntry;
use crate::session::SessionContext;

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatSendResponse {
    pub entries: Vec<ChatEntry>,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub entries: Vec<ChatEntry>,
}

/// `POST /api/chat` — submit a chat message.
///
/// Only the latest message goes to the model. No transcript history and
/// no regimen context ride along.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Arc<SessionContext>>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }

    let mut guard = session.state.lock().await;
    let state = &mut *guard;

    state.transcript.append_user(&req.message);

    let llm = ctx.llm.clone();
    let message = req.message.clone();
    let result =
        tokio::task::spawn_blocking(move || llm.complete(&message, config::CHAT_MAX_TOKENS))
            .await
            .map_err(|e| ApiError::Internal(format!("Chat task failed: {e}")))?;

    let reply = match result {
        Ok(reply) => reply,
        Err(err) => {
            // The user's entry stays; the reply never arrives.
            tracing::warn!(session_id = %session.id, error = %err, "chat reply failed");
            return Err(err.into());
        }
    };

    state.transcript.append_assistant(&reply);
    tracing::info!(
        session_id = %session.id,
        transcript_len = state.transcript.len(),
        reply_chars = reply.len(),
        "chat reply appended"
    );

    let entries = state.transcript.entries();
    let newest = entries[entries.len() - 2..].to_vec();
    Ok(Json(ChatSendResponse { entries: newest }))
}

/// `GET /api/chat` — the full transcript, oldest first.
pub async fn transcript(
    Extension(session): Extension<Arc<SessionContext>>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let guard = session.state.lock().await;
    Ok(Json(TranscriptResponse {
        entries: guard.transcript.entries().to_vec(),
    }))
}
