//! QuakeReport - recent earthquakes from the USGS, colored by magnitude.
//!
//! Command-line front end: prints the time-ordered list, or opens one
//! event's page in the browser.

use std::io::{self, Write};
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info, warn};
use url::Host;

mod cli;

use cli::{Cli, Command, FeedArgs};
use quakereport::client::{FeedClient, build_request_url};
use quakereport::loader::{LoadState, Loader};
use quakereport::models::Earthquake;
use quakereport::output;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    match cli.command {
        Command::List(args) => runtime.block_on(cmd_list(args)),
        Command::Open(args) => runtime.block_on(cmd_open(args)),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// How a load ended, from the list's point of view.
enum Outcome {
    Events(Vec<Earthquake>),
    NoConnection,
    NoEvents,
}

impl Outcome {
    fn empty_message(&self) -> &'static str {
        match self {
            Self::NoConnection => output::NO_INTERNET,
            Self::Events(_) | Self::NoEvents => output::NO_EARTHQUAKES,
        }
    }
}

/// Execute the `list` command - one-shot fetch and print.
async fn cmd_list(args: cli::ListArgs) -> Result<()> {
    let outcome = load(&args.feed).await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match &outcome {
        Outcome::Events(events) if !events.is_empty() => {
            output::write_events(&mut handle, events, args.format)?;
        }
        _ => {
            writeln!(handle, "{}", outcome.empty_message())?;
        }
    }

    Ok(())
}

/// Execute the `open` command - browse to one event's page.
async fn cmd_open(args: cli::OpenArgs) -> Result<()> {
    let outcome = load(&args.feed).await?;

    let events = match outcome {
        Outcome::Events(events) if !events.is_empty() => events,
        other => anyhow::bail!("{}", other.empty_message()),
    };

    let position = usize::try_from(args.index).context("index out of range")?;
    let event = events
        .get(position - 1)
        .with_context(|| format!("only {} earthquakes listed", events.len()))?;

    if event.url().is_empty() {
        anyhow::bail!("earthquake #{} has no event page", args.index);
    }

    info!("opening {}", event.url());
    open_in_browser(event.url())
}

/// Check connectivity, then run one load to completion.
async fn load(feed: &FeedArgs) -> Result<Outcome> {
    if !has_connection(&feed.base_url).await {
        warn!("cannot resolve {}, skipping load", feed.base_url);
        return Ok(Outcome::NoConnection);
    }

    let request_url =
        build_request_url(&feed.base_url, &feed.query()).context("failed to build request URL")?;
    let client =
        FeedClient::with_config(&feed.client_config()).context("failed to create HTTP client")?;

    let loader = Loader::new(client);
    let mut states = WatchStream::new(loader.subscribe());
    let _ = loader.start_load([request_url.as_str()]);

    while let Some(state) = states.next().await {
        match state {
            LoadState::Succeeded(events) => return Ok(Outcome::Events(events)),
            LoadState::Failed(e) => {
                warn!("failed to load earthquakes: {e}");
                return Ok(Outcome::NoEvents);
            }
            LoadState::Empty => return Ok(Outcome::NoEvents),
            LoadState::Idle | LoadState::Loading => {}
        }
    }

    Ok(Outcome::NoEvents)
}

/// Resolve the host of `base_url`. IP literals count as reachable.
async fn has_connection(base_url: &str) -> bool {
    let Ok(url) = url::Url::parse(base_url) else {
        // build_request_url reports the bad URL
        return true;
    };
    let (Some(host), Some(port)) = (url.host(), url.port_or_known_default()) else {
        return true;
    };

    match host {
        Host::Ipv4(_) | Host::Ipv6(_) => true,
        Host::Domain(domain) => match tokio::net::lookup_host((domain, port)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(_) => false,
        },
    }
}

/// Hand a URL to the platform opener.
fn open_in_browser(url: &str) -> Result<()> {
    opener()?
        .arg(url)
        .spawn()
        .with_context(|| format!("failed to open {url}"))?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn opener() -> Result<process::Command> {
    Ok(process::Command::new("xdg-open"))
}

#[cfg(target_os = "macos")]
fn opener() -> Result<process::Command> {
    Ok(process::Command::new("open"))
}

#[cfg(target_os = "windows")]
fn opener() -> Result<process::Command> {
    let mut command = process::Command::new("cmd");
    command.args(["/c", "start", ""]);
    Ok(command)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn opener() -> Result<process::Command> {
    anyhow::bail!("opening a browser is not supported on this platform")
}
