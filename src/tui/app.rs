//! TUI application state and event handling.
//!
//! This module implements the interactive gallery. It manages:
//!
//! - **Search input**: every keystroke goes through the debounced
//!   [`SearchController`]; Enter searches immediately
//! - **Initial listing**: `/sources` is shown while the query is empty
//! - **History panel**: paginated past searches (Tab to focus, Enter re-runs,
//!   Delete removes, Ctrl+X clears)
//! - **Event loop**: keyboard input plus background updates from the controller
//! - **Status messages**: transient feedback for failures and clipboard actions
//!
//! # Architecture
//!
//! `App` owns the controller and the receiving ends of its channels. Network
//! work happens on tokio tasks; the loop only drains channels between polls,
//! so it never blocks on the backend.
//!
//! ```rust,ignore
//! let mut app = App::new(api, history);
//! app.run(&mut terminal)?;
//! ```

use std::sync::{MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::warn;

use super::events::{Action, poll_event};
use super::rendering::{HistoryView, RenderState, render_ui};
use crate::api::{HttpError, ImageApi};
use crate::clipboard::copy_image_url;
use crate::history::{HistoryStore, SharedHistory};
use crate::models::ImageItem;
use crate::search::{
    SearchConfig, SearchController, SearchNotice, SearchSession, SortDirection, sort_by_confidence,
};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Longest query accepted from the keyboard
const MAX_QUERY_LEN: usize = 256;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Pane receiving navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Results,
    History,
}

type SourcesResult = Result<Vec<ImageItem>, HttpError>;

pub struct App<A: ImageApi + Clone> {
    api: A,
    controller: SearchController<A>,
    session_rx: watch::Receiver<SearchSession>,
    notices: broadcast::Receiver<SearchNotice>,
    history: SharedHistory,
    // Initial listing
    sources: Vec<ImageItem>,
    sources_error: Option<String>,
    loading_sources: bool,
    sources_tx: mpsc::UnboundedSender<SourcesResult>,
    sources_rx: mpsc::UnboundedReceiver<SourcesResult>,
    // View state
    query: String,
    sort: SortDirection,
    focus: Focus,
    selected_idx: usize,
    history_idx: usize,
    show_details: bool,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<A: ImageApi + Clone> App<A> {
    pub fn new(api: A, history: SharedHistory) -> Self {
        let controller =
            SearchController::new(api.clone(), Some(history.clone()), SearchConfig::default());
        let session_rx = controller.subscribe();
        let notices = controller.notices();
        let (sources_tx, sources_rx) = mpsc::unbounded_channel();

        Self {
            api,
            controller,
            session_rx,
            notices,
            history,
            sources: Vec::new(),
            sources_error: None,
            loading_sources: false,
            sources_tx,
            sources_rx,
            query: String::new(),
            sort: SortDirection::default(),
            focus: Focus::Results,
            selected_idx: 0,
            history_idx: 0,
            show_details: false,
            should_quit: false,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Check and clear expired status messages
    fn check_and_clear_expired_status(&mut self) {
        let should_clear = self
            .status_message
            .as_ref()
            .map(|msg| Instant::now() >= msg.expires_at)
            .unwrap_or(false);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, HistoryStore> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh_sources();

        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.drain_background();

            let items = self.visible_items();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                let session = self.session_rx.borrow().clone();
                let history = self.history_view();
                terminal.draw(|f| {
                    let state = RenderState {
                        query: &self.query,
                        items: &items,
                        selected_idx: self.selected_idx,
                        session: &session,
                        showing_sources: self.showing_sources(),
                        loading_sources: self.loading_sources,
                        sources_error: self.sources_error.as_deref(),
                        sort: self.sort,
                        focus: self.focus,
                        show_details: self.show_details,
                        history: &history,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action, &items);
        }

        Ok(())
    }

    /// Apply updates produced by background tasks since the last tick
    fn drain_background(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            let count = self.session_rx.borrow_and_update().results.len();
            if !self.showing_sources() && self.selected_idx >= count {
                self.selected_idx = count.saturating_sub(1);
            }
            self.needs_redraw = true;
        }

        loop {
            match self.notices.try_recv() {
                Ok(SearchNotice::Failed { message, .. }) => {
                    self.set_status(
                        format!("✗ Search failed: {}", message),
                        MessageType::Error,
                        STATUS_ERROR_DURATION_MS,
                    );
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        while let Ok(result) = self.sources_rx.try_recv() {
            self.loading_sources = false;
            match result {
                Ok(items) => {
                    self.sources = items;
                    self.sources_error = None;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load sources");
                    self.sources_error = Some(e.user_message());
                }
            }
            self.needs_redraw = true;
        }
    }

    /// Fetch the initial listing in the background
    fn refresh_sources(&mut self) {
        let api = self.api.clone();
        let tx = self.sources_tx.clone();
        self.loading_sources = true;
        self.needs_redraw = true;
        tokio::spawn(async move {
            // Receiver gone means the app has quit
            let _ = tx.send(api.list_sources().await);
        });
    }

    /// The initial listing is shown until something has been typed
    fn showing_sources(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Items in the results pane, in display order
    fn visible_items(&self) -> Vec<ImageItem> {
        if self.showing_sources() {
            sort_by_confidence(&self.sources, self.sort)
        } else {
            sort_by_confidence(&self.session_rx.borrow().results, self.sort)
        }
    }

    fn history_view(&self) -> HistoryView {
        let history = self.lock_history();
        HistoryView {
            entries: history.current_page_entries().to_vec(),
            page: history.current_page(),
            total_pages: history.total_pages(),
            total: history.len(),
            selected_idx: self.history_idx,
        }
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action, items: &[ImageItem]) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearSearch => self.escape(),
            Action::MoveUp => self.move_selection(-1, items.len()),
            Action::MoveDown => self.move_selection(1, items.len()),
            Action::PageUp => self.move_selection(-10, items.len()),
            Action::PageDown => self.move_selection(10, items.len()),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::Submit => match self.focus {
                Focus::Results => self.controller.submit(&self.query),
                Focus::History => self.rerun_selected_history(),
            },
            Action::CopyToClipboard => self.copy_selected(items),
            Action::ToggleSort => {
                self.sort = self.sort.toggled();
                self.selected_idx = 0;
                self.set_status(
                    format!("Sorted by {}", self.sort.label()),
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Action::ToggleHistory => {
                self.focus = match self.focus {
                    Focus::Results => Focus::History,
                    Focus::History => Focus::Results,
                };
                self.history_idx = 0;
                self.show_details = false;
                self.needs_redraw = true;
            }
            Action::ToggleDetails => {
                if self.show_details {
                    self.show_details = false;
                } else if self.selected_idx < items.len() {
                    self.show_details = true;
                }
                self.needs_redraw = true;
            }
            Action::PrevPage | Action::NextPage if self.focus == Focus::History => {
                {
                    let mut history = self.lock_history();
                    if action == Action::PrevPage {
                        history.prev_page();
                    } else {
                        history.next_page();
                    }
                }
                self.history_idx = 0;
                self.needs_redraw = true;
            }
            Action::PrevPage | Action::NextPage => {}
            Action::DeleteEntry => self.delete_selected_history(),
            Action::ClearHistory => {
                self.lock_history().clear();
                self.history_idx = 0;
                self.set_status("✓ History cleared", MessageType::Success, STATUS_SUCCESS_DURATION_MS);
            }
            Action::Refresh => {
                self.refresh_sources();
                if !self.showing_sources() {
                    self.controller.submit(&self.query);
                }
            }
            Action::None => {}
        }
    }

    /// Esc closes the popup, then leaves the history panel, then clears the
    /// query, and quits once there is nothing left to clear
    fn escape(&mut self) {
        if self.show_details {
            self.show_details = false;
        } else if self.focus == Focus::History {
            self.focus = Focus::Results;
        } else if self.query.is_empty() {
            self.should_quit = true;
        } else {
            self.query.clear();
            self.controller.clear();
            self.selected_idx = 0;
        }
        self.needs_redraw = true;
    }

    fn move_selection(&mut self, delta: isize, total: usize) {
        let (idx, total) = match self.focus {
            Focus::Results => (&mut self.selected_idx, total),
            Focus::History => {
                let on_page = self.lock_history().current_page_entries().len();
                (&mut self.history_idx, on_page)
            }
        };

        if total == 0 {
            *idx = 0;
            return;
        }

        let old_idx = *idx;
        let new_idx = (*idx as isize + delta).max(0) as usize;
        *idx = new_idx.min(total - 1);

        if old_idx != *idx {
            self.needs_redraw = true;
        }
    }

    fn update_search(&mut self, c: char) {
        if self.query.chars().count() < MAX_QUERY_LEN {
            self.query.push(c);
            self.query_changed();
        }
    }

    fn delete_char(&mut self) {
        if self.query.pop().is_some() {
            self.query_changed();
        }
    }

    fn query_changed(&mut self) {
        self.controller.set_query(&self.query);
        self.selected_idx = 0;
        self.show_details = false;
        self.focus = Focus::Results;
        self.needs_redraw = true;
    }

    fn copy_selected(&mut self, items: &[ImageItem]) {
        let Some(item) = items.get(self.selected_idx) else {
            self.set_status("✗ No image selected", MessageType::Error, STATUS_ERROR_DURATION_MS);
            return;
        };

        match copy_image_url(item) {
            Ok(()) => {
                self.set_status(
                    "✓ Image URL copied to clipboard",
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Err(e) => {
                self.set_status(
                    format!("✗ Clipboard error: {}", e),
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                );
            }
        }
    }

    fn selected_history_entry(&self) -> Option<(String, String)> {
        self.lock_history()
            .current_page_entries()
            .get(self.history_idx)
            .map(|e| (e.id.clone(), e.query.clone()))
    }

    fn rerun_selected_history(&mut self) {
        let Some((_, query)) = self.selected_history_entry() else {
            return;
        };
        self.query = query;
        self.controller.submit(&self.query);
        self.focus = Focus::Results;
        self.selected_idx = 0;
        self.show_details = false;
        self.needs_redraw = true;
    }

    fn delete_selected_history(&mut self) {
        if self.focus != Focus::History {
            return;
        }
        let Some((id, query)) = self.selected_history_entry() else {
            return;
        };

        let remaining = {
            let mut history = self.lock_history();
            history.remove(&id);
            history.current_page_entries().len()
        };
        self.history_idx = self.history_idx.min(remaining.saturating_sub(1));
        self.set_status(
            format!("✓ Removed \"{}\" from history", query),
            MessageType::Success,
            STATUS_SUCCESS_DURATION_MS,
        );
    }
}
