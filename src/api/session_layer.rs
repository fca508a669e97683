//! Session resolution middleware.
//!
//! Resolves the `X-Session-Id` header against the session table and
//! injects the `Arc<SessionContext>` into request extensions for the
//! handlers behind it.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Header naming the session a request operates on.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Resolve the request's session before the handler runs.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer). On success the session context lands in request
/// extensions and its idle clock is refreshed; the response gets
/// `Cache-Control: no-store` since session responses carry clinical
/// content.
pub async fn resolve_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match resolve_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn resolve_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let raw = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::BadRequest("Missing X-Session-Id header".into()))?;

    let id = Uuid::parse_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("X-Session-Id is not a UUID: {raw}")))?;

    // Lookup refreshes the session's idle clock.
    let session = ctx.registry.get(&id)?;
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));

    Ok(response)
}
