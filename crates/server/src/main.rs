use anyhow::{Context, Result};
use billboard_server::{AppState, ServerConfig, build_app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,billboard_server=debug,billboard_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    config.warn_missing();
    tracing::info!(port = config.port, enrich_limit = config.enrich_limit, "configuration loaded");

    let state = AppState::from_config(&config)?;
    let app = build_app(state, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!("Billboard API server running on http://localhost:{}", config.port);
    tracing::info!("  GET /api/chart        - Hot 100 (current week)");
    tracing::info!("  GET /api/chart/{{name}} - any chart, optional ?date=YYYY-MM-DD");
    tracing::info!("  GET /api/charts       - chart catalog");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
