//! Output formatters for earthquake events.
//!
//! Supports human-readable (colored by magnitude tier), JSON, and NDJSON formats.

use std::io::{self, Write};

use crate::models::{Earthquake, OutputEvent};
use crate::presenter::DisplayFields;

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Shown when a load finished without events.
pub const NO_EARTHQUAKES: &str = "No earthquakes found.";

/// Shown when the connectivity check failed before loading.
pub const NO_INTERNET: &str = "No internet connection.";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Write events in human-readable format.
///
/// One row per event: index, magnitude in its tier color, offset, primary
/// location, date and time.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    for (index, event) in events.iter().enumerate() {
        let fields = DisplayFields::for_event(event);
        write_row(writer, index + 1, &fields)?;
    }
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, number: usize, fields: &DisplayFields) -> io::Result<()> {
    let color = fields.tier.ansi();
    writeln!(
        writer,
        "{DIM}{number:>3}.{RESET} {color}{BOLD}{mag:>4}{RESET} │ \
         {DIM}{offset}{RESET}{BOLD}{primary}{RESET} │ \
         {date} {DIM}{time}{RESET}",
        mag = fields.magnitude,
        offset = fields.location_offset,
        primary = fields.primary_location,
        date = fields.date,
        time = fields.time,
    )
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    let output: Vec<OutputEvent> = events.iter().map(OutputEvent::from).collect();
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// Each event is written as a single line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    for event in events {
        let output = OutputEvent::from(event);
        let json = serde_json::to_string(&output)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(writer: &mut W, events: &[Earthquake], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}
