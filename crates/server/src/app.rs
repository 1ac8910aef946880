//! Application state and router setup.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use billboard_core::{ChartClient, ChartInfo, ChartQuery};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cache::TtlCache;
use crate::config::ServerConfig;
use crate::provider::ChartProvider;
use crate::routes::{self, ChartResponse};
use crate::youtube::{CachedLookup, VideoLookup, YouTubeClient};

/// Upper bound for a whole request, enrichment included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(150);

/// Cache key for one chart week; `date: None` is the current week.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartKey {
    pub chart: String,
    pub date: Option<String>,
}

impl From<&ChartQuery> for ChartKey {
    fn from(query: &ChartQuery) -> Self {
        Self { chart: query.resolved_name().to_string(), date: query.resolved_date().map(str::to_string) }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ChartProvider>,
    pub videos: Option<Arc<dyn VideoLookup>>,
    pub chart_cache: Arc<TtlCache<ChartKey, ChartResponse>>,
    pub catalog_cache: Arc<TtlCache<(), Vec<ChartInfo>>>,
    pub enrich_limit: usize,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn ChartProvider>,
        videos: Option<Arc<dyn VideoLookup>>,
        cache_ttl: Duration,
        enrich_limit: usize,
    ) -> Self {
        Self {
            provider,
            videos,
            chart_cache: Arc::new(TtlCache::new(cache_ttl)),
            catalog_cache: Arc::new(TtlCache::new(cache_ttl)),
            enrich_limit,
        }
    }

    /// Wire the live chart client and, when a key is configured, YouTube search
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let provider: Arc<dyn ChartProvider> =
            Arc::new(ChartClient::new().context("Failed to create chart client")?);

        let videos = match &config.youtube_api_key {
            Some(key) => {
                let client = YouTubeClient::new(key.clone()).context("Failed to create YouTube client")?;
                let lookup: Arc<dyn VideoLookup> = Arc::new(CachedLookup::new(Arc::new(client), config.cache_ttl));
                Some(lookup)
            }
            None => None,
        };

        Ok(Self::new(provider, videos, config.cache_ttl, config.enrich_limit))
    }
}

/// Build the API router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/chart", get(routes::current_chart))
        .route("/api/chart/{name}", get(routes::named_chart))
        .route("/api/charts", get(routes::chart_list))
        .with_state(state)
}

/// Build the full application: API routes, optional static client, middleware
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut app = build_router(state);

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
