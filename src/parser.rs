//! GeoJSON feed parsing.
//!
//! The feed is read field by field through `serde_json::Value` instead of a
//! strict `Deserialize` pass: a missing or mistyped value falls back to its
//! default and never takes its siblings down with it.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::MalformedFeed;
use crate::models::Earthquake;

/// Parse a raw feed body into events, in feed order.
///
/// Never fails. Empty input, a body that is not JSON, or a document without
/// a `features` array all produce an empty list.
#[must_use]
pub fn parse_feed(raw: &str) -> Vec<Earthquake> {
    match try_parse_feed(raw) {
        Ok(events) => events,
        Err(e) => {
            warn!("problem parsing the earthquake JSON results: {e}");
            Vec::new()
        }
    }
}

/// Parse a raw feed body, reporting a body that is not JSON at all.
///
/// # Errors
///
/// Returns [`MalformedFeed`] if the outer document fails to parse.
/// Anything below the top level is tolerated.
pub fn try_parse_feed(raw: &str) -> Result<Vec<Earthquake>, MalformedFeed> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(raw)?;

    let Some(features) = root.get("features").and_then(Value::as_array) else {
        debug!("feed has no features array");
        return Ok(Vec::new());
    };

    let events: Vec<Earthquake> = features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let properties = feature.get("properties").and_then(Value::as_object);
            if properties.is_none() {
                debug!("skipping feature #{index}: no properties object");
            }
            properties.map(event_from_properties)
        })
        .collect();

    debug!("parsed {} of {} features", events.len(), features.len());
    Ok(events)
}

fn event_from_properties(properties: &Map<String, Value>) -> Earthquake {
    Earthquake::new(
        string_field(properties, "place"),
        magnitude_field(properties, "mag"),
        millis_field(properties, "time"),
        string_field(properties, "url"),
    )
}

fn string_field(properties: &Map<String, Value>, key: &str) -> String {
    properties
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn magnitude_field(properties: &Map<String, Value>, key: &str) -> f64 {
    let value = match properties.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|m| m.is_finite()).unwrap_or(0.0)
}

#[allow(clippy::cast_possible_truncation)]
fn millis_field(properties: &Map<String, Value>, key: &str) -> i64 {
    match properties.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_events() {
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("   ").is_empty());
        assert!(parse_feed("\n\t ").is_empty());
    }

    #[test]
    fn test_missing_features_yields_no_events() {
        assert!(parse_feed(r#"{"type":"FeatureCollection","metadata":{}}"#).is_empty());
        assert!(parse_feed(r#"{"features":{"not":"an array"}}"#).is_empty());
        assert!(parse_feed("[1, 2, 3]").is_empty());
    }

    #[test]
    fn test_malformed_json_yields_no_events() {
        assert!(parse_feed("{\"features\": [").is_empty());
        assert!(parse_feed("<html>502 Bad Gateway</html>").is_empty());
        assert!(try_parse_feed("{\"features\": [").is_err());
    }

    #[test]
    fn test_missing_magnitude_defaults_and_siblings_survive() {
        let json = r#"{"features":[
            {"properties":{"place":"10km E of Nowhere","time":5,"url":"u1"}},
            {"properties":{"mag":4.4,"place":"Somewhere","time":6,"url":"u2"}}
        ]}"#;

        let events = parse_feed(json);
        assert_eq!(events.len(), 2);
        assert!(events[0].magnitude().abs() < f64::EPSILON);
        assert_eq!(events[0].location(), "10km E of Nowhere");
        assert_eq!(events[0].time_millis(), 5);
        assert!((events[1].magnitude() - 4.4).abs() < f64::EPSILON);
        assert_eq!(events[1].url(), "u2");
    }

    #[test]
    fn test_each_field_defaults_independently() {
        let json = r#"{"features":[
            {"properties":{"mag":null,"place":42,"time":"later","url":null}}
        ]}"#;

        let events = parse_feed(json);
        assert_eq!(events.len(), 1);
        let quake = &events[0];
        assert!(quake.magnitude().abs() < f64::EPSILON);
        assert_eq!(quake.location(), "");
        assert_eq!(quake.time_millis(), 0);
        assert_eq!(quake.url(), "");
    }

    #[test]
    fn test_numeric_strings_and_float_times() {
        let json = r#"{"features":[
            {"properties":{"mag":"5.5","time":1454124312220.9}},
            {"properties":{"mag":"NaN","time":"1454124312220"}}
        ]}"#;

        let events = parse_feed(json);
        assert!((events[0].magnitude() - 5.5).abs() < f64::EPSILON);
        assert_eq!(events[0].time_millis(), 1_454_124_312_220);
        assert!(events[1].magnitude().abs() < f64::EPSILON);
        assert_eq!(events[1].time_millis(), 1_454_124_312_220);
    }

    #[test]
    fn test_features_without_properties_are_skipped() {
        let json = r#"{"features":[
            "garbage",
            {"type":"Feature"},
            {"properties":"not an object"},
            {"properties":{"mag":3.1,"place":"Kept"}}
        ]}"#;

        let events = parse_feed(json);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].location(), "Kept");
    }

    #[test]
    fn test_parse_sample_feed_in_order() {
        let json = include_str!("../tools/sample_query.json");
        let events = try_parse_feed(json).expect("sample feed is valid JSON");

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].location(), "88km N of Yelizovo, Russia");
        assert_eq!(events[1].location(), "94km SSE of Taron, Papua New Guinea");
        assert_eq!(events[2].location(), "Pacific-Antarctic Ridge");
        assert!((events[0].magnitude() - 7.2).abs() < f64::EPSILON);
        assert_eq!(events[0].time_millis(), 1_454_124_312_220);
        assert_eq!(
            events[2].url(),
            "https://earthquake.usgs.gov/earthquakes/eventpage/us10004gy9"
        );
    }
}
