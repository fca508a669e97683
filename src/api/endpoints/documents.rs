//! Document upload endpoint — PDF order template → regimen merge.
//!
//! `POST /api/documents` — receives a PDF as multipart `file`, extracts
//! its text, asks the model for a regimen fragment, and merges the
//! fragment into the session's regimen.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Regimen;
use crate::session::SessionContext;
use crate::store::merge_fragment;

/// `POST /api/documents` — upload an order template into the session.
///
/// The session lock is held for the whole action, model call included,
/// so uploads, edits and chat turns on one session stay strictly
/// ordered. On any failure the session's regimen is left exactly as it
/// was.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Arc<SessionContext>>,
    mut multipart: Multipart,
) -> Result<Json<Regimen>, ApiError> {
    let bytes = read_file_field(&mut multipart).await?;

    if !looks_like_pdf(&bytes) {
        return Err(ApiError::BadRequest("Upload is not a PDF".into()));
    }

    tracing::info!(
        session_id = %session.id,
        size_bytes = bytes.len(),
        "document upload received"
    );

    let mut guard = session.state.lock().await;
    let state = &mut *guard;

    // PDF parsing and the model call are both blocking work.
    let pdf = ctx.pdf.clone();
    let extractor = ctx.extractor.clone();
    let fragment = tokio::task::spawn_blocking(
        move || -> Result<Option<serde_json::Value>, ApiError> {
            let text = pdf.extract_text(&bytes)?;
            Ok(extractor.extract(&text)?)
        },
    )
    .await
    .map_err(|e| ApiError::Internal(format!("Extraction task failed: {e}")))??;

    let Some(fragment) = fragment else {
        tracing::warn!(session_id = %session.id, "extraction produced no regimen data");
        return Err(ApiError::ExtractionEmpty);
    };

    if let Err(err) = merge_fragment(&mut state.regimen, fragment) {
        tracing::warn!(session_id = %session.id, error = %err, "extraction fragment rejected");
        return Err(err.into());
    }
    state.view.merge_applied(&state.regimen);

    tracing::info!(
        session_id = %session.id,
        diagnosis_set = !state.regimen.diagnosis.is_empty(),
        "extraction merged into regimen"
    );

    Ok(Json(state.regimen.clone()))
}

/// Pull the bytes of the `file` multipart field.
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_err)? {
        if field.name() == Some("file") {
            return field.bytes().await.map_err(map_multipart_err);
        }
    }
    Err(ApiError::BadRequest("Missing multipart field 'file'".into()))
}

fn map_multipart_err(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("Unreadable upload: {err}"))
    }
}

/// Check the PDF magic bytes.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}
