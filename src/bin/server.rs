//! opamp HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` HTTP port (default: 8080)
//! - `OPAMP_CONFIG` Optional YAML configuration file
//! - `OPENAI_API_KEY` API key for the OpenAI adapter
//! - `OPAMP_MODEL`, `OPAMP_BASE_URL`, `OPAMP_PARALLEL`, `OPAMP_STYLE_CATALOG` Overrides
//! - `RUST_LOG` Tracing filter (default: "info,opamp=debug")

use std::sync::Arc;

use anyhow::Context;
use opamp::server::{app_router, AppState};
use opamp::{OpAmpConfig, OpenAICompletion, PipelineOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,opamp=debug".into()),
        )
        .init();

    let config = match std::env::var("OPAMP_CONFIG") {
        Ok(path) => OpAmpConfig::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) => OpAmpConfig::default(),
    }
    .with_env_overrides()?;

    let llm = Arc::new(OpenAICompletion::from_config(&config)?);
    let orchestrator = PipelineOrchestrator::from_config(llm, &config)?;
    let state = AppState::new(orchestrator, config.model.clone());
    let app = app_router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    tracing::info!("opamp server starting on {} (model {})", bind_addr, config.model);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /styles");
    tracing::info!("  POST /run");
    tracing::info!("  POST /reformat");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
