//! Chart data model.
//!
//! All values are built fresh from parsed HTML on every request and are
//! immutable once returned. Field names serialize in camelCase.

use serde::{Deserialize, Serialize};

/// Chart-position statistics for a song.
///
/// `None` means the value was not present on the page, e.g. a new entry
/// has no last-week position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_last_week: Option<u32>,
    pub peak_position: Option<u32>,
    pub weeks_on_chart: Option<u32>,
}

/// One ranked chart entry.
///
/// `title`, `artist` and `cover` are empty strings when they could not be
/// extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub rank: u32,
    pub title: String,
    pub artist: String,
    pub cover: String,
    pub position: Position,
}

/// Navigation link to an adjacent chart week. Currently always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborChart {
    pub url: String,
    pub date: String,
}

/// One dated snapshot of a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// Chart week as `YYYY-MM-DD`, or empty when the page does not say.
    pub week: String,
    /// Songs sorted ascending by rank.
    pub songs: Vec<Song>,
    pub previous_week: NeighborChart,
    pub next_week: NeighborChart,
}

impl Chart {
    /// Returns a copy holding only the first `n` songs.
    pub fn top(&self, n: usize) -> Chart {
        Chart { songs: self.songs.iter().take(n).cloned().collect(), ..self.clone() }
    }

    /// Serializes the chart to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// A chart listing available on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartInfo {
    /// Human-readable, title-cased name such as `Hot 100`.
    pub name: String,
    /// Absolute URL of the chart page.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(rank: u32) -> Song {
        Song { rank, title: format!("Song {}", rank), ..Default::default() }
    }

    #[test]
    fn test_song_serializes_camel_case_with_nulls() {
        let song = Song {
            rank: 1,
            title: "Test Song One".to_string(),
            artist: "Test Artist".to_string(),
            cover: String::new(),
            position: Position { position_last_week: None, peak_position: Some(1), weeks_on_chart: Some(10) },
        };

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["position"]["positionLastWeek"], serde_json::Value::Null);
        assert_eq!(json["position"]["peakPosition"], 1);
        assert_eq!(json["position"]["weeksOnChart"], 10);
        assert_eq!(json["cover"], "");
    }

    #[test]
    fn test_chart_json_shape() {
        let chart = Chart { week: "2024-11-23".to_string(), songs: vec![song(1)], ..Default::default() };
        let json = chart.to_json().unwrap();

        assert_eq!(json["week"], "2024-11-23");
        assert_eq!(json["previousWeek"]["url"], "");
        assert_eq!(json["nextWeek"]["date"], "");
        assert_eq!(json["songs"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_chart_top() {
        let chart = Chart { songs: (1..=30).map(song).collect(), ..Default::default() };

        let top = chart.top(20);
        assert_eq!(top.songs.len(), 20);
        assert_eq!(top.songs.last().unwrap().rank, 20);
        assert_eq!(chart.top(100).songs.len(), 30);
    }
}
