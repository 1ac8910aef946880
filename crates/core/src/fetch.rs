//! Resilient page fetching.
//!
//! [`Fetcher`] performs a GET through a [`Transport`], retrying transient
//! failures with linear backoff and classifying the final failure into a
//! [`ChartError`]. [`HttpTransport`] is the reqwest-backed transport used
//! in production; tests substitute their own.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::error::TransportError;
use crate::{ChartError, Result};

/// Canonical site root.
pub const BILLBOARD_BASE_URL: &str = "https://www.billboard.com";

/// Browser-like identity; the site blocks obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// HTTP fetch configuration.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use billboard_core::FetchConfig;
///
/// let config = FetchConfig::builder()
///     .timeout(Duration::from_secs(10))
///     .max_retries(1)
///     .build();
/// assert_eq!(config.charts_url(), "https://www.billboard.com/charts/");
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Timeout for a single attempt (default: 30s).
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Retries after the first attempt (default: 3).
    pub max_retries: u32,
    /// Base backoff; retry `k` waits `retry_delay * k` (default: 1s).
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: BILLBOARD_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl FetchConfig {
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }

    /// URL of the chart catalog, with trailing slash.
    pub fn charts_url(&self) -> String {
        format!("{}/charts/", self.base_url.trim_end_matches('/'))
    }

    /// URL of a chart page, optionally for a specific week.
    pub fn chart_url(&self, chart_name: &str, date: Option<&str>) -> String {
        match date {
            Some(date) => format!("{}{}/{}", self.charts_url(), chart_name, date),
            None => format!("{}{}", self.charts_url(), chart_name),
        }
    }
}

/// Builder for FetchConfig.
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    pub fn new() -> Self {
        Self { config: FetchConfig::default() }
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.config.base_url = value.into();
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.config.timeout = value;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.config.accept_language = value.into();
        self
    }

    pub fn max_retries(mut self, value: u32) -> Self {
        self.config.max_retries = value;
        self
    }

    pub fn retry_delay(mut self, value: Duration) -> Self {
        self.config.retry_delay = value;
        self
    }

    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl Default for FetchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-attempt HTTP GET capability.
///
/// Implementations return the response body, or a classified
/// [`TransportError`]. Retries are the fetcher's job, not the transport's.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = std::result::Result<String, TransportError>> + Send;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the configured timeout and browser-like headers.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &config.user_agent),
            (ACCEPT, &config.accept),
            (ACCEPT_LANGUAGE, &config.accept_language),
        ] {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ChartError::invalid_input(format!("Invalid {} header: {}", name.as_str(), e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ChartError::network("Failed to build HTTP client", Some(Box::new(e))))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> std::result::Result<String, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { status: status.as_u16() });
        }

        response.text().await.map_err(classify_reqwest)
    }
}

fn classify_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        TransportError::Connection(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::Status { status: status.as_u16() }
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Fetches pages with retry and error classification.
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    config: FetchConfig,
    transport: T,
}

impl Fetcher<HttpTransport> {
    /// Creates a fetcher backed by [`HttpTransport`].
    pub fn http(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(config: FetchConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a URL, retrying transient failures.
    ///
    /// Makes at most `max_retries + 1` sequential attempts. Before retry
    /// `k` it waits `retry_delay * k`.
    ///
    /// # Errors
    ///
    /// - [`ChartError::InvalidInput`] if `url` is not an absolute URL.
    /// - [`ChartError::Timeout`] if the final attempt timed out.
    /// - [`ChartError::Network`] for every other terminal failure.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        Url::parse(url).map_err(|e| ChartError::invalid_input(format!("Invalid URL \"{}\": {}", url, e)))?;

        let mut attempt: u32 = 0;
        loop {
            tracing::debug!(url, attempt = attempt + 1, "fetching page");

            let err = match self.transport.get(url).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            if attempt < self.config.max_retries && err.is_retryable() {
                attempt += 1;
                let delay = self.config.retry_delay * attempt;
                tracing::warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying fetch");
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(self.classify(url, err));
        }
    }

    /// Fetches a chart page, optionally for a specific week.
    pub async fn fetch_chart(&self, chart_name: &str, date: Option<&str>) -> Result<String> {
        let url = self.config.chart_url(chart_name, date);
        self.fetch_page(&url).await
    }

    /// Fetches the chart catalog page.
    pub async fn fetch_charts_list(&self) -> Result<String> {
        let url = self.config.charts_url();
        self.fetch_page(&url).await
    }

    fn classify(&self, url: &str, err: TransportError) -> ChartError {
        if err.is_timeout() {
            let message = format!("Request timed out after {}ms: {}", self.config.timeout.as_millis(), url);
            return ChartError::timeout(message, Some(Box::new(err)));
        }

        if err.status() == Some(404) {
            return ChartError::network(format!("Chart not found (404): {}", url), Some(Box::new(err)));
        }

        ChartError::network(format!("Failed to fetch {}: {}", url, err), Some(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::ErrorKind;

    /// Serves `response` to every connection and counts them.
    async fn serve_raw(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (base_url, connections)
    }

    /// Accepts connections and never answers.
    async fn serve_silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        base_url
    }

    /// Replays a scripted sequence of outcomes; the last one repeats.
    struct ScriptedTransport {
        script: Vec<std::result::Result<String, TransportError>>,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
        attempts_at: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<std::result::Result<String, TransportError>>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                attempts_at: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> std::result::Result<String, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.attempts_at.lock().unwrap().push(Instant::now());
            self.script[n.min(self.script.len() - 1)].clone()
        }
    }

    fn fast_config() -> FetchConfig {
        FetchConfig::builder().retry_delay(Duration::from_millis(1)).build()
    }

    fn run<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(1000));
        assert!(config.user_agent.contains("Mozilla"));
    }

    #[test]
    fn test_chart_urls() {
        let config = FetchConfig::default();
        assert_eq!(config.charts_url(), "https://www.billboard.com/charts/");
        assert_eq!(config.chart_url("hot-100", None), "https://www.billboard.com/charts/hot-100");
        assert_eq!(
            config.chart_url("hot-100", Some("2016-11-19")),
            "https://www.billboard.com/charts/hot-100/2016-11-19"
        );

        let config = FetchConfig::builder().base_url("http://localhost:8080/").build();
        assert_eq!(config.charts_url(), "http://localhost:8080/charts/");
    }

    #[test]
    fn test_success_first_try() {
        let fetcher = Fetcher::new(fast_config(), ScriptedTransport::new(vec![Ok("<html></html>".into())]));
        let body = run(fetcher.fetch_chart("hot-100", None)).unwrap();

        assert_eq!(body, "<html></html>");
        assert_eq!(fetcher.transport().calls(), 1);
        assert_eq!(
            fetcher.transport().urls.lock().unwrap()[0],
            "https://www.billboard.com/charts/hot-100"
        );
    }

    #[test]
    fn test_retryable_failure_exhausts_four_attempts() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Status { status: 503 })]);
        let fetcher = Fetcher::new(fast_config(), transport);

        let err = run(fetcher.fetch_charts_list()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().starts_with("Failed to fetch https://www.billboard.com/charts/"));
        assert_eq!(fetcher.transport().calls(), 4);
    }

    #[test]
    fn test_not_found_fails_after_one_attempt() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Status { status: 404 })]);
        let fetcher = Fetcher::new(fast_config(), transport);

        let err = run(fetcher.fetch_chart("no-such-chart", None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("Chart not found (404)"));
        assert_eq!(fetcher.transport().calls(), 1);
    }

    #[test]
    fn test_timeout_is_classified() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout("elapsed".into()))]);
        let fetcher = Fetcher::new(fast_config(), transport);

        let err = run(fetcher.fetch_chart("hot-100", None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("30000ms"));
        assert_eq!(fetcher.transport().calls(), 4);
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Connection("reset".into())),
            Err(TransportError::Status { status: 429 }),
            Ok("ok".into()),
        ]);
        let fetcher = Fetcher::new(fast_config(), transport);

        assert_eq!(run(fetcher.fetch_chart("hot-100", None)).unwrap(), "ok");
        assert_eq!(fetcher.transport().calls(), 3);
    }

    #[test]
    fn test_zero_retries() {
        let config = FetchConfig::builder().max_retries(0).build();
        let transport = ScriptedTransport::new(vec![Err(TransportError::Status { status: 500 })]);
        let fetcher = Fetcher::new(config, transport);

        assert!(run(fetcher.fetch_chart("hot-100", None)).is_err());
        assert_eq!(fetcher.transport().calls(), 1);
    }

    #[test]
    fn test_invalid_url_never_hits_transport() {
        let config = FetchConfig::builder().base_url("not a url").build();
        let fetcher = Fetcher::new(config, ScriptedTransport::new(vec![Ok(String::new())]));

        let err = run(fetcher.fetch_charts_list()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(fetcher.transport().calls(), 0);
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(&FetchConfig::default()).is_ok());
    }

    #[test]
    fn test_backoff_grows_linearly() {
        let config = FetchConfig::builder().retry_delay(Duration::from_millis(100)).build();
        let transport = ScriptedTransport::new(vec![Err(TransportError::Status { status: 503 })]);
        let fetcher = Fetcher::new(config, transport);

        assert!(run(fetcher.fetch_chart("hot-100", None)).is_err());

        let attempts = fetcher.transport().attempts_at.lock().unwrap().clone();
        assert_eq!(attempts.len(), 4);

        let gaps: Vec<Duration> = attempts.windows(2).map(|w| w[1] - w[0]).collect();
        for (k, gap) in gaps.iter().enumerate() {
            let expected = Duration::from_millis(100 * (k as u64 + 1));
            assert!(*gap >= expected, "retry {} waited {:?}, expected at least {:?}", k + 1, gap, expected);
        }
        // Doubling would make the last wait 400ms.
        assert!(gaps[2] < Duration::from_millis(400), "last wait was {:?}", gaps[2]);
    }

    #[test]
    fn test_http_status_is_reported() {
        run(async {
            let (base_url, connections) =
                serve_raw("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
            let config = FetchConfig::builder().base_url(base_url).retry_delay(Duration::from_millis(1)).build();

            let transport = HttpTransport::new(&config).unwrap();
            let err = transport.get(&config.chart_url("hot-100", None)).await.unwrap_err();
            assert_eq!(err, TransportError::Status { status: 404 });
            assert!(!err.is_retryable());

            let fetcher = Fetcher::http(config).unwrap();
            let err = fetcher.fetch_chart("hot-100", None).await.unwrap_err();
            assert!(err.to_string().contains("Chart not found (404)"));
            assert_eq!(connections.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn test_http_body_is_returned() {
        run(async {
            let (base_url, _) = serve_raw(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
            )
            .await;
            let config = FetchConfig::builder().base_url(base_url).build();

            let body = Fetcher::http(config).unwrap().fetch_charts_list().await.unwrap();
            assert_eq!(body, "<html></html>");
        });
    }

    #[test]
    fn test_refused_connection_is_classified() {
        run(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            drop(listener);

            let config = FetchConfig::builder().base_url(base_url).build();
            let transport = HttpTransport::new(&config).unwrap();
            let err = transport.get(&config.charts_url()).await.unwrap_err();

            assert!(matches!(err, TransportError::Connection(_)), "got {:?}", err);
            assert!(err.is_retryable());
        });
    }

    #[test]
    fn test_slow_server_times_out() {
        run(async {
            let base_url = serve_silent().await;
            let config = FetchConfig::builder()
                .base_url(base_url)
                .timeout(Duration::from_millis(100))
                .max_retries(0)
                .build();

            let transport = HttpTransport::new(&config).unwrap();
            let err = transport.get(&config.charts_url()).await.unwrap_err();
            assert!(err.is_timeout(), "got {:?}", err);

            let err = Fetcher::http(config).unwrap().fetch_charts_list().await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Timeout);
            assert!(err.to_string().contains("100ms"));
        });
    }
}
