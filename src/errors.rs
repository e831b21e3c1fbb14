//! Error types for quakereport.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching the feed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request URL could not be parsed
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// DNS, connection, TLS or timeout failure
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with anything other than 200
    #[error("USGS API error (HTTP {0})")]
    HttpStatus(u16),

    /// The fetch task panicked before producing a result
    #[error("fetch aborted: {0}")]
    Aborted(String),
}

/// The feed body was not a JSON document.
///
/// Never leaves the parser: `parse_feed` turns it into an empty list.
#[derive(Error, Debug)]
#[error("malformed feed: {0}")]
pub struct MalformedFeed(#[from] pub serde_json::Error);
