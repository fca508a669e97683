//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Two route groups: session-scoped routes (document upload, regimen
//! tables, chat, view mode) sit behind the session-resolution middleware
//! and require an `X-Session-Id` header; open routes (health, session
//! create/destroy, the embed WebSocket) do not.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::session_layer;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::config;

/// Build the full API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer of the scoped group). Endpoint handlers use `State<ApiContext>`
/// (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    // Session-scoped routes. Layers apply bottom (innermost) to top
    // (outermost): Extension → session resolution → handler.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let scoped = Router::new()
        .route("/documents", post(endpoints::documents::upload))
        .route("/regimen", get(endpoints::regimen::get_regimen))
        .route(
            "/regimen/phases/:phase/tables/:table",
            get(endpoints::regimen::render_table).put(endpoints::regimen::submit_table),
        )
        .route(
            "/regimen/phases/:phase/therapies",
            get(endpoints::regimen::render_therapies),
        )
        .route(
            "/regimen/phases/:phase/therapies/:name/dosing",
            put(endpoints::regimen::submit_dosing),
        )
        .route(
            "/chat",
            post(endpoints::chat::send).get(endpoints::chat::transcript),
        )
        .route(
            "/view",
            get(endpoints::view::mode).put(endpoints::view::set_mode),
        )
        // The axum default body cap (2 MB) is below the upload limit.
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(session_layer::resolve_session))
        // Extension must be outermost so the middleware can extract ApiContext.
        .layer(axum::Extension(ctx.clone()));

    // Open routes. Session create/destroy cannot require a session, and
    // the embed upgrade authenticates via its query string instead.
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/sessions", post(endpoints::sessions::create))
        .route("/sessions/:id", delete(endpoints::sessions::destroy))
        .route("/embed", get(websocket::embed_subscribe))
        .with_state(ctx);

    Router::new()
        .nest("/api", scoped)
        .nest("/api", open)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
