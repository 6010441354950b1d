//! Debounced, retrying search session.
//!
//! [`SearchController`] owns the query text and publishes a [`SearchSession`]
//! snapshot through a watch channel after every transition:
//!
//! ```text
//! set_query(short) ──► Idle
//! set_query(long)  ──► Debouncing ──(timer)──► Searching ──► Succeeded
//!                                                        └─► Failed
//! ```
//!
//! - The debounce timer is a single slot: arming it aborts the previous one.
//!   The search itself runs in a separate task, so aborting a timer that has
//!   already fired never cancels an issued request.
//! - At most one search sequence (including retries) is in flight. A query
//!   that comes due meanwhile is parked and started when the sequence ends.
//! - Every query change bumps a generation counter; responses for an older
//!   generation are dropped instead of overwriting newer state.
//! - Successful searches are recorded in the injected history store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::sort::average_confidence;
use crate::api::{HttpError, ImageApi};
use crate::history::SharedHistory;
use crate::models::ImageItem;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Queries shorter than this (after trimming) are never sent
pub const DEFAULT_MIN_QUERY_LEN: usize = 4;

const NOTICE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub debounce: Duration,
    /// Extra attempts after the first failure
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Debouncing,
    Searching,
    Succeeded,
    Failed,
}

/// Snapshot of the session published to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    /// Query text as typed
    pub query: String,
    pub results: Vec<ImageItem>,
    pub status: SearchStatus,
    pub error: Option<String>,
}

impl SearchSession {
    pub fn is_searching(&self) -> bool {
        self.status == SearchStatus::Searching
    }
}

/// One-shot events for transient notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SearchNotice {
    Failed { query: String, attempts: u32, message: String },
}

#[derive(Debug)]
struct Pending {
    query: String,
    generation: u64,
}

#[derive(Debug, Default)]
struct Flight {
    /// Ticket of the sequence currently in flight
    ticket: Option<u64>,
    pending: Option<Pending>,
}

struct Shared<A> {
    api: A,
    config: SearchConfig,
    history: Option<SharedHistory>,
    session: watch::Sender<SearchSession>,
    notices: broadcast::Sender<SearchNotice>,
    generation: AtomicU64,
    next_ticket: AtomicU64,
    flight: Mutex<Flight>,
}

pub struct SearchController<A: ImageApi> {
    shared: Arc<Shared<A>>,
    timer: Option<JoinHandle<()>>,
}

impl<A: ImageApi> SearchController<A> {
    /// Create an idle controller; `history` receives successful queries
    pub fn new(api: A, history: Option<SharedHistory>, config: SearchConfig) -> Self {
        let (session, _) = watch::channel(SearchSession::default());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let shared = Shared {
            api,
            config,
            history,
            session,
            notices,
            generation: AtomicU64::new(0),
            next_ticket: AtomicU64::new(0),
            flight: Mutex::new(Flight::default()),
        };

        Self { shared: Arc::new(shared), timer: None }
    }

    pub fn api(&self) -> &A {
        &self.shared.api
    }

    pub fn config(&self) -> &SearchConfig {
        &self.shared.config
    }

    /// Current snapshot
    pub fn session(&self) -> SearchSession {
        self.shared.session.borrow().clone()
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.shared.session.subscribe()
    }

    /// Receiver for one-shot failure notices
    pub fn notices(&self) -> broadcast::Receiver<SearchNotice> {
        self.shared.notices.subscribe()
    }

    /// Update the query and (re)start the debounce timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, text: &str) {
        let Some((query, generation)) = self.begin_query(text) else {
            return;
        };

        self.shared.session.send_modify(|s| s.status = SearchStatus::Debouncing);

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.config.debounce;
        self.timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            shared.start(query, generation);
        }));
    }

    /// Update the query and search immediately, skipping the debounce delay
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, text: &str) {
        if let Some((query, generation)) = self.begin_query(text) {
            self.shared.start(query, generation);
        }
    }

    /// Reset to an empty idle session
    pub fn clear(&mut self) {
        self.disarm();
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut flight = self.shared.lock_flight();
            flight.ticket = None;
            flight.pending = None;
        }
        self.shared.session.send_replace(SearchSession::default());
    }

    /// Common prologue of `set_query`/`submit`: returns the trimmed query to
    /// search for, or `None` after settling a too-short query into `Idle`
    fn begin_query(&mut self, text: &str) -> Option<(String, u64)> {
        self.disarm();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let trimmed = text.trim();

        if trimmed.chars().count() < self.shared.config.min_query_len {
            self.shared.session.send_modify(|s| {
                s.query = text.to_string();
                s.results.clear();
                s.error = None;
                s.status = SearchStatus::Idle;
            });
            return None;
        }

        self.shared.session.send_modify(|s| s.query = text.to_string());
        Some((trimmed.to_string(), generation))
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<A: ImageApi> Drop for SearchController<A> {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl<A: ImageApi> Shared<A> {
    fn lock_flight(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn start(self: &Arc<Self>, query: String, generation: u64) {
        tokio::spawn(Arc::clone(self).run(Pending { query, generation }));
    }

    async fn run(self: Arc<Self>, first: Pending) {
        let Some(ticket) = self.acquire(first.query.clone(), first.generation) else {
            return;
        };

        let mut next = Some(first);
        while let Some(Pending { query, generation }) = next.take() {
            if self.is_current(generation) {
                self.session.send_if_modified(|s| {
                    if !self.is_current(generation) {
                        return false;
                    }
                    s.status = SearchStatus::Searching;
                    s.error = None;
                    true
                });
                let outcome = self.search_with_retry(&query).await;
                self.finish(&query, generation, outcome);
            } else {
                debug!(query = %query, "Skipping superseded search");
            }
            next = self.release_or_next(ticket);
        }
    }

    /// Take the in-flight slot, or park the query if a sequence is running
    fn acquire(&self, query: String, generation: u64) -> Option<u64> {
        let mut flight = self.lock_flight();
        if flight.ticket.is_some() {
            debug!(query = %query, "Search in flight, parking query");
            flight.pending = Some(Pending { query, generation });
            return None;
        }
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        flight.ticket = Some(ticket);
        Some(ticket)
    }

    /// Hand over to a parked query, or free the slot
    fn release_or_next(&self, ticket: u64) -> Option<Pending> {
        let mut flight = self.lock_flight();
        if flight.ticket != Some(ticket) {
            // Cleared while in flight; the slot is no longer ours
            return None;
        }
        let next = flight.pending.take();
        if next.is_none() {
            flight.ticket = None;
        }
        next
    }

    async fn search_with_retry(&self, query: &str) -> Result<Vec<ImageItem>, (HttpError, u32)> {
        let attempts = self.config.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.api.search(query).await {
                Ok(items) => {
                    info!(query = %query, attempt, results = items.len(), "Search succeeded");
                    return Ok(items);
                }
                Err(e) if attempt < attempts => {
                    warn!(query = %query, attempt, error = %e, "Search attempt failed, retrying");
                    sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(query = %query, attempts, error = %e, "Search failed");
                    return Err((e, attempts));
                }
            }
        }
    }

    fn finish(&self, query: &str, generation: u64, outcome: Result<Vec<ImageItem>, (HttpError, u32)>) {
        match outcome {
            Ok(results) => {
                if !self.is_current(generation) {
                    debug!(query = %query, "Discarding stale search response");
                    return;
                }

                // Recorded before publishing so a subscriber that sees
                // `Succeeded` also sees the entry. The file write happens
                // outside the watch lock so readers never wait on it.
                if let Some(history) = &self.history {
                    history.lock().unwrap_or_else(PoisonError::into_inner).add(
                        query,
                        Some(results.len()),
                        Some(average_confidence(&results)),
                    );
                }

                let applied = self.session.send_if_modified(|s| {
                    if !self.is_current(generation) {
                        return false;
                    }
                    s.results = results;
                    s.status = SearchStatus::Succeeded;
                    s.error = None;
                    true
                });

                if !applied {
                    debug!(query = %query, "Discarding stale search response");
                }
            }
            Err((err, attempts)) => {
                let message = err.user_message();
                let applied = self.session.send_if_modified(|s| {
                    if !self.is_current(generation) {
                        return false;
                    }
                    s.results.clear();
                    s.status = SearchStatus::Failed;
                    s.error = Some(message.clone());
                    true
                });

                if !applied {
                    debug!(query = %query, "Discarding stale search failure");
                    return;
                }
                // No subscribers is fine
                let _ = self.notices.send(SearchNotice::Failed {
                    query: query.to_string(),
                    attempts,
                    message,
                });
            }
        }
    }
}
