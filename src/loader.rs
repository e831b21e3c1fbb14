//! Background feed loading.
//!
//! A [`Loader`] runs one fetch-then-parse unit at a time on the tokio
//! runtime and publishes its progress through a `watch` channel:
//!
//! ```text
//! Idle ──start──▶ Loading ──▶ Succeeded(events) | Failed(error)
//!   │                 ▲
//!   └──start (no url)─┴─▶ Empty
//! reset: any state ──▶ Idle
//! ```
//!
//! `reset` does not abort the request in flight. Its result is dropped when
//! it arrives because the loader generation has moved on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::FeedSource;
use crate::errors::FetchError;
use crate::models::Earthquake;
use crate::parser::parse_feed;

/// Observable loader state.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// Nothing requested, or reset
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// Fetch and parse finished; the list may be empty
    Succeeded(Vec<Earthquake>),
    /// The fetch failed
    Failed(Arc<FetchError>),
    /// No URL was given, nothing was fetched
    Empty,
}

impl LoadState {
    /// Check if the state is final for the current request.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::Empty)
    }

    /// Events to show. Empty for every state but a non-empty `Succeeded`.
    #[must_use]
    pub fn events(&self) -> &[Earthquake] {
        match self {
            Self::Succeeded(events) => events,
            _ => &[],
        }
    }
}

/// Runs feed loads for one logical request.
pub struct Loader<S> {
    source: Arc<S>,
    state: Arc<watch::Sender<LoadState>>,
    generation: Arc<AtomicU64>,
}

impl<S: FeedSource> Loader<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        let (state, _rx) = watch::channel(LoadState::Idle);
        Self {
            source: Arc::new(source),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Receiver for state changes. The current value is readable immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Start loading from the first of `urls`.
    ///
    /// With no URLs, or an empty first URL, the loader goes straight to
    /// [`LoadState::Empty`] without touching the network. A call while a
    /// load is already in flight is ignored.
    ///
    /// Returns the handle of the spawned load, or `None` if nothing was spawned.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_load<I, U>(&self, urls: I) -> Option<JoinHandle<()>>
    where
        I: IntoIterator<Item = U>,
        U: AsRef<str>,
    {
        let url = urls
            .into_iter()
            .next()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty());

        let mut generation = 0;
        let started = self.state.send_if_modified(|state| {
            if matches!(state, LoadState::Loading) {
                return false;
            }
            generation = self.generation.load(Ordering::SeqCst);
            *state = if url.is_some() {
                LoadState::Loading
            } else {
                LoadState::Empty
            };
            true
        });

        if !started {
            debug!("load already in flight, ignoring start");
            return None;
        }

        let Some(url) = url else {
            debug!("no request url, loader is empty");
            return None;
        };

        debug!("loading {}", url);

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        Some(tokio::spawn(async move {
            // Run the fetch as its own task so a panicking source still ends the load
            let fetch = tokio::spawn(async move { source.fetch(&url).await });
            let result = fetch.await.unwrap_or_else(|e| {
                warn!("feed source panicked: {e}");
                Err(FetchError::Aborted(e.to_string()))
            });

            let outcome = match result {
                Ok(raw) => LoadState::Succeeded(parse_feed(&raw)),
                Err(e) => {
                    debug!("load failed: {e}");
                    LoadState::Failed(Arc::new(e))
                }
            };

            let delivered = state.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *state = outcome;
                true
            });

            if !delivered {
                debug!("dropping result of a load that was reset");
            }
        }))
    }

    /// Forget any result and go back to [`LoadState::Idle`].
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = LoadState::Idle;
        });
        debug!("loader reset");
    }
}
