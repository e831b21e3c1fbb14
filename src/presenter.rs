//! Display mapping for earthquake events.
//!
//! Pure functions from an [`Earthquake`] (plus the local timezone) to the
//! strings and color tier the list shows. Nothing here is stored on the record.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::models::Earthquake;

/// Separator between the offset and the primary location in USGS place names.
pub const LOCATION_SEPARATOR: &str = " of ";

/// Offset shown when the place has no distance-and-direction clause.
pub const NEAR_THE: &str = "Near the";

const DATE_FORMAT: &str = "%b %d, %Y";
const TIME_FORMAT: &str = "%-I:%M %p";

/// Magnitude color bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    /// Floor 0 or 1
    #[serde(rename = "tier0_1")]
    Tier0To1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
    Tier6,
    Tier7,
    Tier8,
    Tier9,
    /// Floor 10 and above, and every negative floor
    #[serde(rename = "tier10plus")]
    Tier10Plus,
}

impl ColorTier {
    /// RGB components of the tier color.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Tier0To1 => (0x4A, 0x7B, 0xA7),
            Self::Tier2 => (0x04, 0xB4, 0xB3),
            Self::Tier3 => (0x10, 0xCA, 0xC9),
            Self::Tier4 => (0xF5, 0xA6, 0x23),
            Self::Tier5 => (0xFF, 0x7D, 0x50),
            Self::Tier6 => (0xFC, 0x66, 0x44),
            Self::Tier7 => (0xE7, 0x5F, 0x40),
            Self::Tier8 => (0xE1, 0x3A, 0x20),
            Self::Tier9 => (0xD9, 0x32, 0x18),
            Self::Tier10Plus => (0xC0, 0x38, 0x23),
        }
    }

    /// Color as `#RRGGBB`.
    #[must_use]
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// 24-bit ANSI foreground escape for terminal output.
    #[must_use]
    pub fn ansi(self) -> String {
        let (r, g, b) = self.rgb();
        format!("\x1b[38;2;{r};{g};{b}m")
    }
}

/// Get the color tier for a magnitude.
///
/// The magnitude is floored, floors 0 through 9 get their own tier (0 and 1
/// share one) and everything else lands in [`ColorTier::Tier10Plus`]. That
/// includes negative magnitudes: -0.5 floors to -1 and is colored as 10+.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn color_tier(magnitude: f64) -> ColorTier {
    match magnitude.floor() as i64 {
        0 | 1 => ColorTier::Tier0To1,
        2 => ColorTier::Tier2,
        3 => ColorTier::Tier3,
        4 => ColorTier::Tier4,
        5 => ColorTier::Tier5,
        6 => ColorTier::Tier6,
        7 => ColorTier::Tier7,
        8 => ColorTier::Tier8,
        9 => ColorTier::Tier9,
        _ => ColorTier::Tier10Plus,
    }
}

/// Split a place into `(offset, primary)`.
///
/// Splits once, on the first `" of "`; the offset keeps the separator.
/// Without a separator the offset is [`NEAR_THE`] and the place is returned whole.
#[must_use]
pub fn split_location(raw: &str) -> (String, String) {
    match raw.split_once(LOCATION_SEPARATOR) {
        Some((offset, primary)) => (format!("{offset}{LOCATION_SEPARATOR}"), primary.to_string()),
        None => (NEAR_THE.to_string(), raw.to_string()),
    }
}

/// Format a magnitude with exactly one decimal digit.
///
/// Rounds half to even after scaling by ten: `3.25` gives `"3.2"`,
/// `3.75` gives `"3.8"`.
#[must_use]
pub fn format_magnitude(value: f64) -> String {
    // + 0.0 turns -0.0 into 0.0
    let rounded = (value * 10.0).round_ties_even() / 10.0 + 0.0;
    format!("{rounded:.1}")
}

/// Format the event date in the local timezone, e.g. "Jan 30, 2016".
#[must_use]
pub fn format_date(epoch_millis: i64) -> String {
    format_date_in(epoch_millis, &Local)
}

/// Format the event time of day in the local timezone, e.g. "3:25 AM".
#[must_use]
pub fn format_time(epoch_millis: i64) -> String {
    format_time_in(epoch_millis, &Local)
}

/// Format the event date in the given timezone.
#[must_use]
pub fn format_date_in<Tz: TimeZone>(epoch_millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    to_zone(epoch_millis, tz).format(DATE_FORMAT).to_string()
}

/// Format the event time of day in the given timezone.
#[must_use]
pub fn format_time_in<Tz: TimeZone>(epoch_millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    to_zone(epoch_millis, tz).format(TIME_FORMAT).to_string()
}

fn to_zone<Tz: TimeZone>(epoch_millis: i64, tz: &Tz) -> DateTime<Tz> {
    // Out-of-range instants render as the epoch
    let utc = DateTime::<Utc>::from_timestamp_millis(epoch_millis).unwrap_or_default();
    utc.with_timezone(tz)
}

/// Everything the list row shows for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub tier: ColorTier,
    pub color: String,
    pub magnitude: String,
    pub location_offset: String,
    pub primary_location: String,
    pub date: String,
    pub time: String,
}

impl DisplayFields {
    /// Derive the display fields for an event in the local timezone.
    #[must_use]
    pub fn for_event(event: &Earthquake) -> Self {
        Self::for_event_in(event, &Local)
    }

    /// Derive the display fields for an event in the given timezone.
    #[must_use]
    pub fn for_event_in<Tz: TimeZone>(event: &Earthquake, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let tier = color_tier(event.magnitude());
        let (location_offset, primary_location) = split_location(event.location());

        Self {
            tier,
            color: tier.hex(),
            magnitude: format_magnitude(event.magnitude()),
            location_offset,
            primary_location,
            date: format_date_in(event.time_millis(), tz),
            time: format_time_in(event.time_millis(), tz),
        }
    }
}
