//! QuakeReport - recent earthquakes from the USGS, colored by magnitude.
//!
//! The pipeline runs one way: [`client`] fetches the raw feed, [`parser`]
//! turns it into [`models::Earthquake`] records, and [`presenter`] derives
//! what a list row shows. [`loader`] sequences fetch and parse in the
//! background and publishes the outcome.

pub mod client;
pub mod errors;
pub mod loader;
pub mod models;
pub mod output;
pub mod parser;
pub mod presenter;
