//! Data models for parsed earthquake events.
//!
//! The record keeps only the four fields the list needs. Display
//! attributes are derived from it at render time (see `presenter`).

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::presenter::DisplayFields;

/// A single earthquake event taken from the feed.
///
/// Every field is always present; missing JSON values are replaced with
/// `""`, `0.0` or `0` by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Earthquake {
    location: String,
    magnitude: f64,
    time_millis: i64,
    url: String,
}

impl Earthquake {
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        magnitude: f64,
        time_millis: i64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            magnitude,
            time_millis,
            url: url.into(),
        }
    }

    /// Raw place description, possibly with an offset clause ("5km N of ...").
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Richter magnitude, unscaled.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Event time in milliseconds since the Unix epoch (UTC).
    #[must_use]
    pub fn time_millis(&self) -> i64 {
        self.time_millis
    }

    /// Event page URL. May be empty.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time_millis).single()
    }
}

/// Event as emitted in JSON/NDJSON output.
///
/// Carries the raw record plus the derived display fields.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvent {
    pub time: String,
    pub time_millis: i64,
    pub magnitude: f64,
    pub place: String,
    pub url: String,
    pub display: DisplayFields,
}

impl From<&Earthquake> for OutputEvent {
    fn from(e: &Earthquake) -> Self {
        Self {
            time: e
                .time()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".into()),
            time_millis: e.time_millis(),
            magnitude: e.magnitude(),
            place: e.location().to_string(),
            url: e.url().to_string(),
            display: DisplayFields::for_event(e),
        }
    }
}
