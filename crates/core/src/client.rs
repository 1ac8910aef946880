//! Chart query API.
//!
//! [`ChartClient`] validates caller input, fetches the page through a
//! [`Fetcher`] and hands the HTML to the extractor. The free functions
//! [`get_chart`] and [`list_charts`] use a default client.
//!
//! # Example
//!
//! ```rust,no_run
//! use billboard_core::{ChartClient, ChartQuery};
//!
//! # async fn example() -> billboard_core::Result<()> {
//! let client = ChartClient::new()?;
//!
//! // Current Hot 100
//! let chart = client.get_chart(ChartQuery::default()).await?;
//!
//! // A specific chart and week
//! let chart = client.get_chart(("billboard-200", "2024-01-13")).await?;
//! println!("{} songs for week {}", chart.songs.len(), chart.week);
//! # Ok(())
//! # }
//! ```

use crate::chart::{Chart, ChartInfo};
use crate::extract::{parse_chart, parse_charts_list_with_base};
use crate::fetch::{FetchConfig, Fetcher, HttpTransport, Transport};
use crate::text::{is_valid_chart_name, is_valid_date_format};
use crate::{ChartError, Result};

/// Chart requested when the caller names none.
pub const DEFAULT_CHART: &str = "hot-100";

/// Which chart and week to fetch.
///
/// Both parts are optional: a missing (or empty) name means
/// [`DEFAULT_CHART`], a missing (or empty) date means the current week.
/// Converts from `()`, a chart name, or a `(name, date)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartQuery {
    pub chart_name: Option<String>,
    pub date: Option<String>,
}

impl ChartQuery {
    pub fn new(chart_name: impl Into<String>) -> Self {
        Self { chart_name: Some(chart_name.into()), date: None }
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Chart name after defaulting.
    pub fn resolved_name(&self) -> &str {
        match self.chart_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_CHART,
        }
    }

    /// Date after defaulting; `None` means the current week.
    pub fn resolved_date(&self) -> Option<&str> {
        self.date.as_deref().filter(|date| !date.is_empty())
    }

    /// Checks the name and date without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidInput`] for a name that is not a
    /// lowercase slug, or a date that is not a real `YYYY-MM-DD` date.
    pub fn validate(&self) -> Result<()> {
        let name = self.resolved_name();
        if !is_valid_chart_name(name) {
            return Err(ChartError::invalid_input(format!(
                "Invalid chart name: \"{}\". Chart names should be lowercase with hyphens (e.g., \"hot-100\").",
                name
            )));
        }

        if let Some(date) = self.resolved_date()
            && !is_valid_date_format(date)
        {
            return Err(ChartError::invalid_input(format!(
                "Invalid date format: \"{}\". Use YYYY-MM-DD format (e.g., \"2024-01-15\").",
                date
            )));
        }

        Ok(())
    }
}

impl From<()> for ChartQuery {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<&str> for ChartQuery {
    fn from(chart_name: &str) -> Self {
        Self::new(chart_name)
    }
}

impl From<String> for ChartQuery {
    fn from(chart_name: String) -> Self {
        Self::new(chart_name)
    }
}

impl From<(&str, &str)> for ChartQuery {
    fn from((chart_name, date): (&str, &str)) -> Self {
        Self::new(chart_name).date(date)
    }
}

/// Fetches and parses charts.
///
/// Generic over the [`Transport`] so the network can be replaced in tests.
/// Holds no mutable state; calls are independent and may run concurrently.
#[derive(Debug, Clone)]
pub struct ChartClient<T = HttpTransport> {
    fetcher: Fetcher<T>,
}

impl ChartClient<HttpTransport> {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Result<Self> {
        Ok(Self { fetcher: Fetcher::http(config)? })
    }
}

impl<T: Transport> ChartClient<T> {
    pub fn with_transport(config: FetchConfig, transport: T) -> Self {
        Self { fetcher: Fetcher::new(config, transport) }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Gets one chart week.
    ///
    /// # Errors
    ///
    /// - [`ChartError::InvalidInput`] before any network access for a bad
    ///   name or date.
    /// - [`ChartError::Network`] / [`ChartError::Timeout`] from the fetch.
    /// - [`ChartError::NotFound`] / [`ChartError::Parse`] from extraction.
    pub async fn get_chart(&self, query: impl Into<ChartQuery>) -> Result<Chart> {
        let query = query.into();
        query.validate()?;

        let name = query.resolved_name();
        let date = query.resolved_date();
        tracing::info!(chart = name, date = date.unwrap_or("current"), "getting chart");

        let html = self.fetcher.fetch_chart(name, date).await?;
        let chart = parse_chart(&html)?;

        tracing::debug!(chart = name, week = %chart.week, songs = chart.songs.len(), "chart ready");
        Ok(chart)
    }

    /// Lists every chart linked from the catalog page.
    ///
    /// # Errors
    ///
    /// Same as [`get_chart`](Self::get_chart), minus input validation.
    pub async fn list_charts(&self) -> Result<Vec<ChartInfo>> {
        tracing::info!("listing charts");

        let html = self.fetcher.fetch_charts_list().await?;
        parse_charts_list_with_base(&html, &self.fetcher.config().base_url)
    }

    /// Callback flavour of [`get_chart`](Self::get_chart).
    ///
    /// Every outcome, validation failures included, is delivered to
    /// `callback`; nothing is returned.
    pub async fn get_chart_with_callback<F>(&self, query: impl Into<ChartQuery>, callback: F)
    where
        F: FnOnce(Result<Chart>),
    {
        callback(self.get_chart(query).await);
    }

    /// Callback flavour of [`list_charts`](Self::list_charts).
    pub async fn list_charts_with_callback<F>(&self, callback: F)
    where
        F: FnOnce(Result<Vec<ChartInfo>>),
    {
        callback(self.list_charts().await);
    }
}

/// Gets a chart with a default client.
///
/// ```rust,no_run
/// # async fn example() -> billboard_core::Result<()> {
/// let chart = billboard_core::get_chart("hot-100").await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_chart(query: impl Into<ChartQuery>) -> Result<Chart> {
    let query = query.into();
    query.validate()?;
    ChartClient::new()?.get_chart(query).await
}

/// Lists charts with a default client.
pub async fn list_charts() -> Result<Vec<ChartInfo>> {
    ChartClient::new()?.list_charts().await
}
