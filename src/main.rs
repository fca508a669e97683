//! Server binary: load settings, wire the model client, serve the API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chemora::api::server;
use chemora::api::types::ApiContext;
use chemora::config::{self, Settings};
use chemora::pipeline::AnthropicClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // A missing credential is fatal before the server binds.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(model = %settings.model, bind = %settings.bind_addr, "configuration loaded");

    let llm = Arc::new(AnthropicClient::from_settings(&settings));
    let ctx = ApiContext::new(llm);

    let listener = match server::bind(&settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(ctx, listener).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
