//! HTTP handlers and the JSON response envelope.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use billboard_core::{Chart, ChartError, ChartInfo, ChartQuery, ErrorKind, NeighborChart};
use serde::{Deserialize, Serialize};

use crate::app::{AppState, ChartKey};
use crate::youtube::{EnrichedSong, enrich_songs};

/// Chart payload returned by the chart routes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub week: String,
    pub songs: Vec<EnrichedSong>,
    pub previous_week: NeighborChart,
    pub next_week: NeighborChart,
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub date: Option<String>,
}

/// Chart failure rendered as an error envelope
#[derive(Debug)]
pub struct ApiError(pub ChartError);

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.kind().code(), error = %self.0, "chart request failed");
        } else {
            tracing::warn!(code = self.0.kind().code(), error = %self.0, "chart request rejected");
        }

        let body = ErrorBody { success: false, error: self.0.to_string(), code: self.0.kind().code() };
        (status, Json(body)).into_response()
    }
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { success: true, data })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /api/chart`: current Hot 100
pub async fn current_chart(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let chart = chart_response(&state, ChartQuery::default()).await?;
    Ok(ok(chart))
}

/// `GET /api/chart/{name}?date=YYYY-MM-DD`
pub async fn named_chart(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ChartQuery { chart_name: Some(name), date: params.date };
    let chart = chart_response(&state, query).await?;
    Ok(ok(chart))
}

/// `GET /api/charts`: chart catalog
pub async fn chart_list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if let Some(charts) = state.catalog_cache.get(&()) {
        return Ok(ok(charts));
    }

    let charts: Vec<ChartInfo> = state.provider.charts().await?;
    state.catalog_cache.insert((), charts.clone());
    Ok(ok(charts))
}

async fn chart_response(state: &AppState, query: ChartQuery) -> Result<ChartResponse, ChartError> {
    query.validate()?;

    let key = ChartKey::from(&query);
    if let Some(cached) = state.chart_cache.get(&key) {
        tracing::debug!(chart = %key.chart, "serving chart from cache");
        return Ok(cached);
    }

    let chart = state.provider.chart(query).await?;
    let response = enrich_chart(state, chart).await;

    state.chart_cache.insert(key, response.clone());
    Ok(response)
}

async fn enrich_chart(state: &AppState, chart: Chart) -> ChartResponse {
    let Chart { week, songs, previous_week, next_week } = chart.top(state.enrich_limit);
    let songs = enrich_songs(songs, state.videos.as_deref(), state.enrich_limit).await;

    ChartResponse { week, songs, previous_week, next_week }
}
