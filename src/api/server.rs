//! API server lifecycle.
//!
//! Binds the configured address, mounts `api_router()`, spawns the
//! idle-session sweeper, and serves until ctrl-c.

use std::time::Duration;

use tokio::net::TcpListener;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// How often the idle-session sweeper runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bind the listener for the configured address.
pub async fn bind(addr: &str) -> Result<TcpListener, String> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))
}

/// Run the API server on an already-bound listener until shutdown.
pub async fn run(ctx: ApiContext, listener: TcpListener) -> Result<(), String> {
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;
    tracing::info!(%addr, "API server listening");

    spawn_idle_sweeper(ctx.clone());

    let app = api_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Drop sessions idle past the expiry window, once a minute.
fn spawn_idle_sweeper(ctx: ApiContext) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        // The first tick completes immediately; consume it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = ctx.registry.sweep_idle();
            if removed > 0 {
                tracing::info!(removed, "idle sessions swept");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::pipeline::MockLlmClient;

    fn test_ctx() -> ApiContext {
        ApiContext::new(Arc::new(MockLlmClient::new("ok")))
    }

    #[tokio::test]
    async fn bound_server_answers_health() {
        let listener = bind("127.0.0.1:0").await.expect("bind failed");
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(run(test_ctx(), listener));

        let url = format!("http://127.0.0.1:{port}/api/health");
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sessions"], 0);

        handle.abort();
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let listener = bind("127.0.0.1:0").await.expect("bind failed");
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(run(test_ctx(), listener));

        let url = format!("http://127.0.0.1:{port}/nonexistent");
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        handle.abort();
    }

    #[tokio::test]
    async fn bind_rejects_malformed_address() {
        let result = bind("not-an-address").await;
        assert!(result.is_err());
    }
}
