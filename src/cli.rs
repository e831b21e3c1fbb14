//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use quakereport::client::{
    CONNECT_TIMEOUT_SECS, ClientConfig, DEFAULT_LIMIT, DEFAULT_MIN_MAGNITUDE, FeedQuery,
    READ_TIMEOUT_SECS, USGS_REQUEST_URL,
};
use quakereport::output::Format;

/// Recent earthquakes from the USGS feed, colored by magnitude.
#[derive(Parser, Debug)]
#[command(name = "quakereport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the most recent earthquakes
    List(ListArgs),

    /// Open the event page of one listed earthquake in the browser
    Open(OpenArgs),
}

/// Feed settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// Minimum magnitude to request
    #[arg(long, env = "QUAKEREPORT_MIN_MAGNITUDE", default_value = DEFAULT_MIN_MAGNITUDE)]
    pub min_magnitude: String,

    /// Maximum number of events to request
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Event query endpoint
    #[arg(long, default_value = USGS_REQUEST_URL)]
    pub base_url: String,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(long, default_value_t = READ_TIMEOUT_SECS)]
    pub read_timeout: u64,
}

impl FeedArgs {
    /// Query parameters for the request URL.
    #[must_use]
    pub fn query(&self) -> FeedQuery {
        FeedQuery {
            min_magnitude: self.min_magnitude.clone(),
            limit: self.limit,
        }
    }

    /// HTTP client settings.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            read_timeout: Duration::from_secs(self.read_timeout),
            ..ClientConfig::default()
        }
    }
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `open` command.
#[derive(Parser, Debug)]
pub struct OpenArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Position of the event in the list (starting at 1)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub index: u32,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
