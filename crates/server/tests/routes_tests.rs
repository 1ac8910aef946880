//! Router integration tests against in-memory chart and video sources
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use billboard_core::{Chart, ChartError, ChartInfo, ChartQuery, Position, Result, Song};
use billboard_server::provider::ChartProvider;
use billboard_server::youtube::{Video, VideoLookup};
use billboard_server::{AppState, ServerConfig, build_app, build_router};
use serde_json::Value;
use tower::ServiceExt;

struct FakeProvider {
    chart_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self { chart_calls: AtomicUsize::new(0), list_calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl ChartProvider for FakeProvider {
    async fn chart(&self, query: ChartQuery) -> Result<Chart> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);

        match query.resolved_name() {
            "missing" => Err(ChartError::not_found("No songs found in chart data.")),
            "broken" => Err(ChartError::network("Failed to fetch chart: connection reset", None)),
            _ => Ok(Chart {
                week: query.resolved_date().unwrap_or("2024-11-23").to_string(),
                songs: (1..=25)
                    .map(|rank| Song {
                        rank,
                        title: format!("Song {}", rank),
                        artist: format!("Artist {}", rank),
                        cover: String::new(),
                        position: Position { position_last_week: None, peak_position: Some(rank), weeks_on_chart: Some(1) },
                    })
                    .collect(),
                ..Default::default()
            }),
        }
    }

    async fn charts(&self) -> Result<Vec<ChartInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            ChartInfo { name: "Hot 100".to_string(), url: "https://www.billboard.com/charts/hot-100".to_string() },
            ChartInfo {
                name: "Billboard 200".to_string(),
                url: "https://www.billboard.com/charts/billboard-200".to_string(),
            },
        ])
    }
}

struct FakeVideos;

#[async_trait]
impl VideoLookup for FakeVideos {
    async fn find_video(&self, _query: &str) -> Option<Video> {
        Some(Video::from_id("abc123"))
    }
}

fn app_with(provider: Arc<FakeProvider>, videos: bool, enrich_limit: usize) -> Router {
    let videos: Option<Arc<dyn VideoLookup>> = if videos { Some(Arc::new(FakeVideos)) } else { None };
    build_router(AppState::new(provider, videos, Duration::from_secs(60), enrich_limit))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 20), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_current_chart_is_trimmed_and_enriched() {
    let provider = FakeProvider::new();
    let (status, json) = get(app_with(provider.clone(), true, 20), "/api/chart").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["week"], "2024-11-23");

    let songs = json["data"]["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 20);
    assert_eq!(songs[0]["rank"], 1);
    assert_eq!(songs[0]["position"]["peakPosition"], 1);
    assert_eq!(songs[19]["video"]["watchUrl"], "https://www.youtube.com/watch?v=abc123");
    assert_eq!(json["data"]["previousWeek"]["url"], "");
}

#[tokio::test]
async fn test_without_video_lookup_videos_are_null() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 5), "/api/chart").await;

    assert_eq!(status, StatusCode::OK);
    let songs = json["data"]["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 5);
    assert!(songs.iter().all(|song| song["video"].is_null()));
}

#[tokio::test]
async fn test_named_chart_with_date() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 20), "/api/chart/billboard-200?date=2024-01-13").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["week"], "2024-01-13");
}

#[tokio::test]
async fn test_not_found_maps_to_404() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 20), "/api/chart/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No songs found in chart data.");
}

#[tokio::test]
async fn test_invalid_chart_name_maps_to_400() {
    let provider = FakeProvider::new();
    let (status, json) = get(app_with(provider.clone(), false, 20), "/api/chart/Hot%20100").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert_eq!(provider.chart_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_date_maps_to_400() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 20), "/api/chart/hot-100?date=2024-13-45").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid date format"));
}

#[tokio::test]
async fn test_network_error_maps_to_500() {
    let (status, json) = get(app_with(FakeProvider::new(), false, 20), "/api/chart/broken").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "NETWORK_ERROR");
}

#[tokio::test]
async fn test_chart_responses_are_cached() {
    let provider = FakeProvider::new();
    let app = app_with(provider.clone(), true, 20);

    let (_, first) = get(app.clone(), "/api/chart/hot-100").await;
    let (_, second) = get(app.clone(), "/api/chart").await;
    let (_, dated) = get(app, "/api/chart/hot-100?date=2024-01-13").await;

    assert_eq!(first, second);
    assert_eq!(dated["data"]["week"], "2024-01-13");
    assert_eq!(provider.chart_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_chart_list_is_cached() {
    let provider = FakeProvider::new();
    let app = app_with(provider.clone(), false, 20);

    let (status, json) = get(app.clone(), "/api/charts").await;
    get(app, "/api/charts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][1]["name"], "Billboard 200");
    assert_eq!(provider.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_static_client_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>client</html>").unwrap();

    let config = ServerConfig { static_dir: Some(dir.path().to_path_buf()), ..Default::default() };
    let state = AppState::new(FakeProvider::new(), None, config.cache_ttl, config.enrich_limit);
    let app = build_app(state, &config);

    let response = app.oneshot(Request::get("/some/client/route").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<html>client</html>");
}
