//! Claim Veracity Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server: loads artifacts, wires scorers, routes, and
//! the Prometheus exporter.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use claim_veracity_analyzer::api::{create_router, AppState};
use claim_veracity_analyzer::config::PipelineConfig;
use claim_veracity_analyzer::metrics::Metrics;
use claim_veracity_analyzer::pipeline::VeracityPipeline;
use claim_veracity_analyzer::scorers::build_scorers;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("claim_veracity_analyzer=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PipelineConfig::from_env();
    let scorers = build_scorers(&config.scorers).context("building scorers")?;

    let pipeline = VeracityPipeline::new(config, scorers);
    pipeline
        .load()
        .context("loading fusion and source-prior artifacts")?;

    let metrics = Metrics::init();
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let router = create_router(state).merge(metrics.router());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "serving");
    axum::serve(listener, router).await?;
    Ok(())
}
