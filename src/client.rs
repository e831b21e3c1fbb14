//! USGS event query client.
//!
//! Provides async HTTP access to the FDSN event query endpoint.
//! Uses reqwest with rustls for TLS.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::FetchError;

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Default read timeout in seconds.
pub const READ_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakereport/", env!("CARGO_PKG_VERSION"));

/// USGS FDSN event query endpoint.
pub const USGS_REQUEST_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Minimum magnitude used when none is configured.
pub const DEFAULT_MIN_MAGNITUDE: &str = "6";

/// Number of events requested per query.
pub const DEFAULT_LIMIT: u32 = 10;

/// Query parameters for the event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Minimum magnitude, passed through as text
    pub min_magnitude: String,
    /// Maximum number of events
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            min_magnitude: DEFAULT_MIN_MAGNITUDE.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Build the request URL for a query against `base`.
///
/// Produces `<base>?format=geojson&limit=<n>&minmag=<m>&orderby=time`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` is not an absolute URL.
pub fn build_request_url(base: &str, query: &FeedQuery) -> Result<Url, FetchError> {
    let limit = query.limit.to_string();
    let url = Url::parse_with_params(
        base,
        [
            ("format", "geojson"),
            ("limit", limit.as_str()),
            ("minmag", query.min_magnitude.as_str()),
            ("orderby", "time"),
        ],
    )?;
    Ok(url)
}

/// Timeouts and identity for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Anything that can turn a request URL into a raw feed body.
pub trait FeedSource: Send + Sync + 'static {
    /// Fetch the body behind `request_url`.
    fn fetch(&self, request_url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP client for the USGS feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Create a client with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_config(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// GET `request_url` and return the body as text.
    ///
    /// Only HTTP 200 counts as success; the body of any other status is
    /// discarded unread. The response is dropped, and its connection released,
    /// on every return path.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for an unparsable URL,
    /// [`FetchError::HttpStatus`] for a non-200 answer and
    /// [`FetchError::Network`] for transport failures and timeouts.
    #[instrument(skip(self))]
    pub async fn fetch_text(&self, request_url: &str) -> Result<String, FetchError> {
        let url = Url::parse(request_url)?;

        debug!("fetching feed from {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("error response code: {}", status.as_u16());
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        debug!("fetched {} bytes", text.len());
        Ok(text)
    }
}

impl FeedSource for FeedClient {
    async fn fetch(&self, request_url: &str) -> Result<String, FetchError> {
        self.fetch_text(request_url).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::parser::parse_feed;

    const QUERY_PATH: &str = "/fdsnws/event/1/query";

    #[test]
    fn test_build_request_url() {
        let url = build_request_url(USGS_REQUEST_URL, &FeedQuery::default()).expect("valid base");
        assert_eq!(
            url.as_str(),
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson&limit=10&minmag=6&orderby=time"
        );
    }

    #[test]
    fn test_build_request_url_encodes_magnitude() {
        let query = FeedQuery {
            min_magnitude: "4.5 ".to_string(),
            limit: 3,
        };
        let url = build_request_url("http://localhost:9/q", &query).expect("valid base");
        assert_eq!(url.query(), Some("format=geojson&limit=3&minmag=4.5+&orderby=time"));
    }

    #[test]
    fn test_build_request_url_rejects_relative_base() {
        let err = build_request_url("/fdsnws/event/1/query", &FeedQuery::default());
        assert!(matches!(err, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", QUERY_PATH)
            .match_query(Matcher::UrlEncoded("format".into(), "geojson".into()))
            .with_status(200)
            .with_body(r#"{"features":[]}"#)
            .create_async()
            .await;

        let base = format!("{}{QUERY_PATH}", server.url());
        let url = build_request_url(&base, &FeedQuery::default()).expect("valid base");
        let client = FeedClient::new().expect("client builds");

        let body = client.fetch_text(url.as_str()).await.expect("fetch succeeds");
        assert_eq!(body, r#"{"features":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_maps_non_200_to_http_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", QUERY_PATH)
            .with_status(503)
            .with_body(r#"{"features":[{"properties":{"mag":1.0}}]}"#)
            .create_async()
            .await;

        let client = FeedClient::new().expect("client builds");
        let result = client.fetch_text(&format!("{}{QUERY_PATH}", server.url())).await;

        assert!(matches!(result, Err(FetchError::HttpStatus(503))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_url() {
        let client = FeedClient::new().expect("client builds");
        let result = client.fetch_text("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_maps_refused_connection_to_network() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = FeedClient::new().expect("client builds");
        let result = client.fetch_text(&format!("http://127.0.0.1:{port}/")).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_maps_read_timeout_to_network() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        // Accept, then hold the socket open without answering
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = ClientConfig {
            read_timeout: Duration::from_secs(1),
            ..ClientConfig::default()
        };
        let client = FeedClient::with_config(&config).expect("client builds");

        let started = std::time::Instant::now();
        let result = client.fetch_text(&format!("http://127.0.0.1:{port}/")).await;

        assert!(matches!(result, Err(FetchError::Network(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_fetch_then_parse_two_features() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":6.5,"place":"12km SW of Kokopo, Papua New Guinea","time":1700000000000,"url":"https://earthquake.usgs.gov/earthquakes/eventpage/a"}},
            {"type":"Feature","properties":{"mag":2.1,"place":"Central Alaska","time":1699999000000,"url":"https://earthquake.usgs.gov/earthquakes/eventpage/b"}}
        ]}"#;

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", QUERY_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let base = format!("{}{QUERY_PATH}", server.url());
        let url = build_request_url(&base, &FeedQuery::default()).expect("valid base");
        let client = FeedClient::new().expect("client builds");

        let raw = client.fetch(url.as_str()).await.expect("fetch succeeds");
        let events = parse_feed(&raw);

        assert_eq!(events.len(), 2);
        assert!((events[0].magnitude() - 6.5).abs() < f64::EPSILON);
        assert_eq!(events[0].location(), "12km SW of Kokopo, Papua New Guinea");
        assert_eq!(events[0].time_millis(), 1_700_000_000_000);
        assert_eq!(events[0].url(), "https://earthquake.usgs.gov/earthquakes/eventpage/a");
        assert!((events[1].magnitude() - 2.1).abs() < f64::EPSILON);
        assert_eq!(events[1].location(), "Central Alaska");
        assert_eq!(events[1].time_millis(), 1_699_999_000_000);
        assert_eq!(events[1].url(), "https://earthquake.usgs.gov/earthquakes/eventpage/b");
    }
}
