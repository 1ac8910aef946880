//! Chart and catalog extraction from rendered Billboard HTML.
//!
//! Every per-row field is extracted independently: a missing or malformed
//! field falls back to its empty value and never aborts the row or the
//! page. Fields with more than one markup shape are resolved by an ordered
//! list of strategies where the first one to produce a value wins.
//!
//! Only a page that yields no entities at all is an error
//! ([`ChartError::NotFound`]).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::chart::{Chart, ChartInfo, NeighborChart, Position, Song};
use crate::fetch::BILLBOARD_BASE_URL;
use crate::parse::{Document, Element};
use crate::text::{format_date_to_yyyymmdd, parse_leading_int, to_title_case};
use crate::{ChartError, Result};

/// CSS selectors for the current (2024+) site layout.
///
/// These are the first thing to update when the site changes.
pub mod selectors {
    pub const CHART_ROW: &str = "ul.o-chart-results-list-row";
    pub const TITLE: &str = "h3.c-title";
    pub const ARTIST: &str = "span.c-label.a-no-trucate";
    pub const ARTIST_LINK: &str = "span.c-label.a-no-trucate a";
    pub const RANK_ITEM: &str = "li.o-chart-results-list__item";
    pub const LABEL: &str = "span.c-label";
    pub const COVER_IMAGE: &str = "img.c-lazy-image__img";
    pub const STAT_CONTAINER: &str = "div.lrv-u-flex.lrv-u-justify-content-space-between";
    pub const STAT_LABEL: &str = "span.c-span";
    pub const DATE_ATTR: &str = "[data-date]";
    pub const DATE_BUTTON: &str = ".date-selector__button, [class*=\"date-selector\"] button";
    pub const CHART_LINK: &str = "a[href*=\"/charts/\"]";
}

/// Attribute holding a row's rank.
const RANK_ATTR: &str = "data-detail-target";

/// Image URLs containing any of these are site placeholders.
const PLACEHOLDER_MARKERS: [&str; 2] = ["lazyload-fallback", "placeholder"];
const IMAGE_HOST: &str = "charts-static.billboard.com";

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TITLE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+ \d+, \d{4})").unwrap());
static RESOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").unwrap());
static CHART_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/charts/([a-z0-9-]+)").unwrap());

/// Extraction strategy over a chart row.
type RowStrategy<'a, T> = fn(&Element<'a>) -> Option<T>;

/// Returns the first value produced by `strategies`, tried in order.
fn first_match<I: ?Sized, T>(input: &I, strategies: &[fn(&I) -> Option<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(input))
}

/// Whitespace-collapsed text of the first match of `selector`, or empty.
pub fn extract_text(element: &Element<'_>, selector: &str) -> String {
    element
        .select_first(selector)
        .ok()
        .flatten()
        .map(|el| el.clean_text())
        .unwrap_or_default()
}

/// Attribute of the first match of `selector`, or empty.
pub fn extract_attr(element: &Element<'_>, selector: &str, attr: &str) -> String {
    element
        .select_first(selector)
        .ok()
        .flatten()
        .and_then(|el| el.attr(attr))
        .unwrap_or_default()
        .to_string()
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

fn rank_from_attr(row: &Element<'_>) -> Option<u32> {
    row.attr(RANK_ATTR).and_then(parse_leading_int).and_then(positive)
}

fn rank_from_label(row: &Element<'_>) -> Option<u32> {
    let item = row.select_first(selectors::RANK_ITEM).ok().flatten()?;
    let label = item.select_first(selectors::LABEL).ok().flatten()?;
    parse_leading_int(&label.text()).and_then(positive)
}

/// Rank of a chart row, or 0 when neither source parses.
pub fn extract_rank(row: &Element<'_>) -> u32 {
    let strategies: [RowStrategy<'_, u32>; 2] = [rank_from_attr as RowStrategy<'_, u32>, rank_from_label as RowStrategy<'_, u32>];
    first_match(row, &strategies).unwrap_or(0)
}

pub fn extract_title(row: &Element<'_>) -> String {
    extract_text(row, selectors::TITLE)
}

fn artist_from_link(row: &Element<'_>) -> Option<String> {
    Some(extract_text(row, selectors::ARTIST_LINK)).filter(|s| !s.is_empty())
}

fn artist_from_label(row: &Element<'_>) -> Option<String> {
    Some(extract_text(row, selectors::ARTIST)).filter(|s| !s.is_empty())
}

/// Artist of a chart row: link text inside the artist label, else the label's own text.
pub fn extract_artist(row: &Element<'_>) -> String {
    let strategies: [RowStrategy<'_, String>; 2] = [artist_from_link as RowStrategy<'_, String>, artist_from_label as RowStrategy<'_, String>];
    first_match(row, &strategies).unwrap_or_default()
}

/// Whether `url` is a real cover image rather than a lazy-load placeholder.
pub fn is_valid_image_url(url: &str) -> bool {
    if url.is_empty() || PLACEHOLDER_MARKERS.iter().any(|marker| url.contains(marker)) {
        return false;
    }
    url.contains(IMAGE_HOST) || url.starts_with("http")
}

/// Width of the first `WxH` token in `url`, or 0.
pub fn image_resolution(url: &str) -> u32 {
    RESOLUTION_RE
        .captures(url)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Highest-resolution valid cover image in a chart row.
///
/// Each image contributes its `data-lazy-src` and then its `src`. Only
/// candidates carrying a `WxH` size token qualify, and a candidate replaces
/// the current best only when strictly larger, so ties keep the first found.
/// Returns an empty string when no candidate qualifies.
pub fn extract_cover(row: &Element<'_>) -> String {
    let images = row.select(selectors::COVER_IMAGE).unwrap_or_default();

    let mut best = "";
    let mut best_size = 0;
    let candidates = images
        .iter()
        .flat_map(|img| [img.attr("data-lazy-src"), img.attr("src")])
        .flatten()
        .filter(|url| is_valid_image_url(url));

    for url in candidates {
        let size = image_resolution(url);
        if size > best_size {
            best = url;
            best_size = size;
        }
    }

    best.to_string()
}

/// Last-week, peak and weeks-on-chart figures of a chart row.
///
/// Each stat container pairs a label with a value; labels are matched by
/// keyword (`LW`, then `PEAK`, then `WEEK`). Missing or non-numeric values
/// stay `None`.
pub fn extract_position_stats(row: &Element<'_>) -> Position {
    let mut position = Position::default();

    for container in row.select(selectors::STAT_CONTAINER).unwrap_or_default() {
        let label = extract_text(&container, selectors::STAT_LABEL).to_uppercase();
        let Some(value) = parse_leading_int(&extract_text(&container, selectors::LABEL))
            .and_then(|v| u32::try_from(v).ok())
        else {
            continue;
        };

        if label.contains("LW") {
            position.position_last_week = Some(value);
        } else if label.contains("PEAK") {
            position.peak_position = Some(value);
        } else if label.contains("WEEK") {
            position.weeks_on_chart = Some(value);
        }
    }

    position
}

fn week_from_data_attr(doc: &Document) -> Option<String> {
    let el = doc.select_first(selectors::DATE_ATTR).ok().flatten()?;
    el.attr("data-date")
        .filter(|date| ISO_DATE_RE.is_match(date))
        .map(str::to_string)
}

fn week_from_title(doc: &Document) -> Option<String> {
    let title = doc.title()?;
    let caps = TITLE_DATE_RE.captures(&title)?;
    Some(format_date_to_yyyymmdd(&caps[1])).filter(|date| !date.is_empty())
}

fn week_from_date_button(doc: &Document) -> Option<String> {
    let button = doc.select_first(selectors::DATE_BUTTON).ok().flatten()?;
    Some(format_date_to_yyyymmdd(&button.text())).filter(|date| !date.is_empty())
}

/// Chart week as `YYYY-MM-DD`, or empty.
///
/// Sources in priority order: a `data-date` attribute, a date in the page
/// title, the date selector's text.
pub fn extract_chart_week(doc: &Document) -> String {
    first_match(doc, &[week_from_data_attr, week_from_title, week_from_date_button]).unwrap_or_default()
}

/// Builds a song from a row, or `None` when the row has neither title nor artist.
///
/// `index` is the row's zero-based position on the page; it supplies the
/// rank when the row carries none.
fn extract_song(row: &Element<'_>, index: usize) -> Option<Song> {
    let title = extract_title(row);
    let artist = extract_artist(row);
    if title.is_empty() && artist.is_empty() {
        return None;
    }

    let rank = match extract_rank(row) {
        0 => u32::try_from(index + 1).unwrap_or(u32::MAX),
        rank => rank,
    };

    Some(Song { rank, title, artist, cover: extract_cover(row), position: extract_position_stats(row) })
}

/// Parses a single chart page.
///
/// # Errors
///
/// - [`ChartError::NotFound`] if no row yields a song.
/// - [`ChartError::Parse`] if the row markup cannot be traversed.
///
/// # Example
///
/// ```rust
/// use billboard_core::extract::parse_chart;
///
/// let html = r#"
///     <ul class="o-chart-results-list-row" data-detail-target="1">
///         <li class="o-chart-results-list__item"><h3 class="c-title">Song</h3></li>
///     </ul>
/// "#;
/// let chart = parse_chart(html).unwrap();
/// assert_eq!(chart.songs[0].title, "Song");
/// ```
pub fn parse_chart(html: &str) -> Result<Chart> {
    let doc = Document::parse(html);
    let week = extract_chart_week(&doc);

    let rows = doc
        .select(selectors::CHART_ROW)
        .map_err(|e| ChartError::parse("Failed to parse chart HTML", Some(Box::new(e))))?;

    let mut songs: Vec<Song> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| extract_song(row, index))
        .collect();

    tracing::debug!(rows = rows.len(), songs = songs.len(), week = %week, "parsed chart page");

    if songs.is_empty() {
        return Err(ChartError::not_found(
            "No songs found in chart data. Billboard HTML structure may have changed.",
        ));
    }

    songs.sort_by_key(|song| song.rank);

    Ok(Chart { week, songs, previous_week: NeighborChart::default(), next_week: NeighborChart::default() })
}

/// Parses the chart catalog page, linking entries to the canonical site.
pub fn parse_charts_list(html: &str) -> Result<Vec<ChartInfo>> {
    parse_charts_list_with_base(html, BILLBOARD_BASE_URL)
}

/// Parses the chart catalog page.
///
/// Every link into `/charts/` contributes its slug once, in page order;
/// the catalog root and slugs shorter than three characters are skipped.
///
/// # Errors
///
/// - [`ChartError::NotFound`] if the page links to no charts.
/// - [`ChartError::Parse`] if the link markup cannot be traversed.
pub fn parse_charts_list_with_base(html: &str, base_url: &str) -> Result<Vec<ChartInfo>> {
    let doc = Document::parse(html);
    let base_url = base_url.trim_end_matches('/');

    let links = doc
        .select(selectors::CHART_LINK)
        .map_err(|e| ChartError::parse("Failed to parse charts list HTML", Some(Box::new(e))))?;

    let mut seen = HashSet::new();
    let mut charts = Vec::new();

    for link in &links {
        let Some(slug) = link.attr("href").and_then(chart_slug) else {
            continue;
        };

        if slug == "charts" || slug.len() < 3 || !seen.insert(slug.clone()) {
            continue;
        }

        charts.push(ChartInfo {
            name: to_title_case(&slug.replace('-', " ")),
            url: format!("{}/charts/{}", base_url, slug),
        });
    }

    tracing::debug!(links = links.len(), charts = charts.len(), "parsed charts list");

    if charts.is_empty() {
        return Err(ChartError::not_found("No charts found. Billboard HTML structure may have changed."));
    }

    Ok(charts)
}

fn chart_slug(href: &str) -> Option<String> {
    CHART_SLUG_RE.captures(href).map(|caps| caps[1].to_lowercase())
}
