//! WebSocket feed for the embedded sub-view.
//!
//! `GET /api/embed?session=<uuid>` upgrades to a WebSocket that streams
//! embed snapshots: one JSON frame at connect, then one frame per change
//! to the diagnosis, regimen name, or a Phase 1 table. Phase 2 data is
//! never part of the snapshot.
//!
//! The feed is one-way. Inbound frames other than Close are ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::session::SessionContext;

/// Query parameters for the embed upgrade.
///
/// The session id rides in the query string because browser WebSocket
/// clients cannot set request headers.
#[derive(Deserialize)]
pub struct EmbedQuery {
    session: Uuid,
}

/// `GET /api/embed` — upgrade to the embed snapshot stream.
pub async fn embed_subscribe(
    ws: WebSocketUpgrade,
    State(ctx): State<ApiContext>,
    Query(query): Query<EmbedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = ctx.registry.get(&query.session)?;
    tracing::info!(session_id = %session.id, "embed subscriber connected");
    Ok(ws.on_upgrade(move |socket| stream_snapshots(socket, session)))
}

/// Pump snapshot frames until the client goes away.
///
/// The watch channel holds only the latest snapshot, so a slow client
/// skips intermediate states instead of queueing them.
async fn stream_snapshots(socket: WebSocket, session: Arc<SessionContext>) {
    let mut rx = {
        let guard = session.state.lock().await;
        guard.view.subscribe_embed()
    };

    let (mut sink, mut stream) = socket.split();

    loop {
        // The watch Ref must drop before the next await point.
        let frame = {
            let snapshot = rx.borrow_and_update();
            match serde_json::to_string(&*snapshot) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(session_id = %session.id, error = %e, "embed frame serialization failed");
                    return;
                }
            }
        };

        if sink.send(Message::Text(frame)).await.is_err() {
            break;
        }

        // Wait for either a new snapshot or the client hanging up.
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    match changed {
                        Ok(()) => break,
                        Err(_) => {
                            let _ = sink.send(Message::Close(None)).await;
                            return;
                        }
                    }
                }
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                            tracing::debug!(session_id = %session.id, "embed subscriber disconnected");
                            return;
                        }
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    tracing::debug!(session_id = %session.id, "embed subscriber disconnected");
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
