//! Music video lookup through the YouTube Data API.
//!
//! [`enrich_songs`] attaches a [`Video`] to the top songs of a chart. The
//! search itself sits behind [`VideoLookup`] so routes can be tested without
//! network access.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use billboard_core::Song;
use billboard_core::text::collapse_whitespace;
use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Songs searched concurrently per batch.
pub const BATCH_SIZE: usize = 5;

/// Pause between batches to stay clear of the API rate limit.
pub const BATCH_DELAY: Duration = Duration::from_millis(100);

static PARENTHESES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static FEATURING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)featuring|&").unwrap());

/// A playable music video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    pub embed_url: String,
    pub watch_url: String,
}

impl Video {
    pub fn from_id(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        let embed_url = format!("https://www.youtube.com/embed/{}", video_id);
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        Self { video_id, embed_url, watch_url }
    }
}

/// A chart song with its video, `null` when none was looked up or found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSong {
    #[serde(flatten)]
    pub song: Song,
    pub video: Option<Video>,
}

impl EnrichedSong {
    pub fn without_video(song: Song) -> Self {
        Self { song, video: None }
    }
}

/// Builds the search phrase for a song's official video.
///
/// Parenthesised parts of the title are dropped. The artist is cut at the
/// first "Featuring" (any case), `&` or comma.
pub fn build_search_query(title: &str, artist: &str) -> String {
    let clean_title = collapse_whitespace(&PARENTHESES_RE.replace_all(title, ""));

    let primary = FEATURING_RE.split(artist).next().unwrap_or_default();
    let primary = primary.split(',').next().unwrap_or_default();
    let clean_artist = collapse_whitespace(primary);

    format!("{} {} official music video", clean_artist, clean_title)
}

/// Searches for a video matching a query.
///
/// Implementations swallow their own failures: a lookup that cannot be
/// completed yields `None`.
#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn find_video(&self, query: &str) -> Option<Video>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// YouTube Data API search client
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> reqwest::Result<Self> {
        Self::with_base_url(api_key, YOUTUBE_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { http, api_key: api_key.into(), base_url: base_url.into() })
    }

    /// Returns the id of the top music-category result, if any.
    pub async fn search(&self, query: &str) -> reqwest::Result<Option<String>> {
        let response: SearchResponse = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("videoCategoryId", "10"),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_video_id(response))
    }
}

fn first_video_id(response: SearchResponse) -> Option<String> {
    response.items.into_iter().find_map(|item| item.id.video_id)
}

#[async_trait]
impl VideoLookup for YouTubeClient {
    async fn find_video(&self, query: &str) -> Option<Video> {
        match self.search(query).await {
            Ok(id) => id.map(Video::from_id),
            Err(err) => {
                tracing::error!(query, error = %err, "YouTube search failed");
                None
            }
        }
    }
}

/// Memoizes another lookup's answers, misses included.
pub struct CachedLookup {
    inner: Arc<dyn VideoLookup>,
    cache: TtlCache<String, Option<Video>>,
}

impl CachedLookup {
    pub fn new(inner: Arc<dyn VideoLookup>, ttl: Duration) -> Self {
        Self { inner, cache: TtlCache::new(ttl) }
    }
}

#[async_trait]
impl VideoLookup for CachedLookup {
    async fn find_video(&self, query: &str) -> Option<Video> {
        let key = query.to_lowercase();
        if let Some(video) = self.cache.get(&key) {
            return video;
        }

        let video = self.inner.find_video(query).await;
        self.cache.insert(key, video.clone());
        video
    }
}

/// Attaches videos to the first `limit` songs.
///
/// Songs are searched in concurrent batches of [`BATCH_SIZE`] with a
/// [`BATCH_DELAY`] pause between batches. Songs past `limit`, and every song
/// when `lookup` is `None`, get no video. Order and length are preserved.
pub async fn enrich_songs(songs: Vec<Song>, lookup: Option<&dyn VideoLookup>, limit: usize) -> Vec<EnrichedSong> {
    let Some(lookup) = lookup else {
        tracing::debug!("video lookup disabled, skipping enrichment");
        return songs.into_iter().map(EnrichedSong::without_video).collect();
    };

    let split = limit.min(songs.len());
    let mut songs = songs;
    let remaining = songs.split_off(split);

    let mut enriched = Vec::with_capacity(songs.len() + remaining.len());
    let batch_count = songs.len().div_ceil(BATCH_SIZE);

    for (index, batch) in songs.chunks(BATCH_SIZE).enumerate() {
        let lookups = batch.iter().map(|song| async move {
            let query = build_search_query(&song.title, &song.artist);
            let video = lookup.find_video(&query).await;
            EnrichedSong { song: song.clone(), video }
        });
        enriched.extend(join_all(lookups).await);

        if index + 1 < batch_count {
            tokio::time::sleep(BATCH_DELAY).await;
        }
    }

    enriched.extend(remaining.into_iter().map(EnrichedSong::without_video));
    enriched
}
