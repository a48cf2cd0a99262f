//! Single-screen view state machine.
//!
//! State lives in a `watch` channel: readers subscribe, all mutations go
//! through `send_modify` so there is exactly one serialized writer per
//! screen instance. One-shot notices ride a bounded `broadcast` channel and
//! are never replayed; a late subscriber misses earlier ones on purpose.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::repository::{FetchOutcome, WeatherRepository};
use crate::types::Snapshot;

const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Raw per-screen state. Read via [`ScreenModel::state`], collapsed for
/// rendering with [`ViewState::display`].
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub is_loading: bool,
    pub is_error: bool,
    pub search_query: String,
    pub search_result: Option<Snapshot>,
    pub selected: Option<Snapshot>,
}

/// Exactly one display mode holds at any instant. Precedence is fixed:
/// loading wins while a fetch is in flight, and results/selections beat a
/// stale error flag once available.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Loading,
    Error,
    SearchResult(Snapshot),
    Detail(Snapshot),
    Empty,
}

impl ViewState {
    /// Collapse the raw flags into the single current display mode.
    pub fn display(&self) -> DisplayState {
        if self.is_loading {
            DisplayState::Loading
        } else if self.is_error {
            DisplayState::Error
        } else if let Some(result) = &self.search_result {
            DisplayState::SearchResult(result.clone())
        } else if let Some(selected) = &self.selected {
            DisplayState::Detail(selected.clone())
        } else {
            DisplayState::Empty
        }
    }
}

/// One-shot advisory notices (toasts). Not part of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    CityNotFound,
    NoConnectivity,
    SaveFailed,
    LoadFailed,
    OfflineShowingSaved,
}

impl Notice {
    pub fn user_message(&self) -> &'static str {
        match self {
            Notice::CityNotFound => "City not found",
            Notice::NoConnectivity => "No internet connection",
            Notice::SaveFailed => "Error saving city",
            Notice::LoadFailed => "Error loading saved city",
            Notice::OfflineShowingSaved => "Offline: Showing saved data",
        }
    }
}

/// Where a successful fetch outcome lands in the view state.
#[derive(Debug, Clone, Copy)]
enum FetchTarget {
    /// A user-submitted search: result shown as a search result.
    SearchResult,
    /// The startup refresh of the last saved city: result becomes the
    /// current selection, not a new search.
    Selected,
}

/// Drives a single screen: consumes intents, owns the view state, emits
/// notices.
pub struct ScreenModel {
    repository: Arc<WeatherRepository>,
    state: watch::Sender<ViewState>,
    notices: broadcast::Sender<Notice>,
    // Monotonic fetch generation; stale completions are dropped instead of
    // overwriting newer state.
    generation: AtomicU64,
    teardown: CancellationToken,
}

impl ScreenModel {
    pub fn new(repository: Arc<WeatherRepository>) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            repository,
            state,
            notices,
            generation: AtomicU64::new(0),
            teardown: CancellationToken::new(),
        }
    }

    /// Subscribe to view state updates.
    pub fn state(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Current view state snapshot.
    pub fn current_state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Subscribe to one-shot notices. Past notices are not replayed.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Tear down the screen: in-flight fetches stop applying state.
    pub fn shutdown(&self) {
        self.teardown.cancel();
    }

    /// Update the search box text. Never triggers a fetch.
    pub fn set_search_query(&self, text: &str) {
        self.apply(|s| s.search_query = text.to_string());
    }

    /// Search for a city. Whitespace-only queries are ignored.
    pub async fn submit_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.run_fetch(query, FetchTarget::SearchResult).await;
    }

    /// Commit to a search result: persist it and make it the detail view.
    ///
    /// On a store failure the selection is not applied; the search result
    /// stays on screen and a save-error notice is emitted.
    pub fn select_result(&self, snapshot: Snapshot) {
        match self.repository.select_as_current(&snapshot) {
            Ok(()) => self.apply(move |s| {
                s.selected = Some(snapshot);
                s.search_result = None;
                s.search_query.clear();
            }),
            Err(e) => {
                tracing::warn!("Failed to save selected city: {}", e);
                self.notify(Notice::SaveFailed);
            }
        }
    }

    /// Startup intent: restore the last viewed city.
    ///
    /// With a network, the saved key is re-fetched and routed into the
    /// selection (a background refresh, not a new search). Without one, the
    /// cached observation is shown directly with an offline notice.
    pub async fn initialize(&self) {
        let last = match self.repository.load_last_known() {
            Ok(last) => last,
            Err(e) => {
                tracing::error!("Failed to load last saved city: {}", e);
                self.apply(|s| s.is_error = true);
                self.notify(Notice::LoadFailed);
                return;
            }
        };

        let Some(observation) = last else {
            return;
        };

        if self.repository.is_network_reachable() {
            let key = observation.location_key.clone();
            self.run_fetch(&key, FetchTarget::Selected).await;
        } else {
            tracing::info!(
                city = %observation.location_key,
                "Offline at startup; showing cached observation"
            );
            self.apply(move |s| s.selected = Some(observation.into_snapshot()));
            self.notify(Notice::OfflineShowingSaved);
        }
    }

    async fn run_fetch(&self, query: &str, target: FetchTarget) {
        let claimed = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.apply(|s| s.is_loading = true);

        let outcome = tokio::select! {
            () = self.teardown.cancelled() => return,
            outcome = self.repository.fetch_observation(query) => outcome,
        };

        if self.generation.load(Ordering::SeqCst) != claimed {
            tracing::debug!(query, "Dropping stale fetch outcome");
            return;
        }

        match outcome {
            FetchOutcome::Fetched {
                snapshot,
                save_warning,
            } => {
                self.apply(move |s| {
                    s.is_loading = false;
                    s.is_error = false;
                    match target {
                        FetchTarget::SearchResult => s.search_result = Some(snapshot),
                        FetchTarget::Selected => s.selected = Some(snapshot),
                    }
                });
                if save_warning.is_some() {
                    self.notify(Notice::SaveFailed);
                }
            }
            FetchOutcome::RemoteFailure(e) => {
                tracing::warn!(query, "Search failed: {}", e);
                self.apply(|s| {
                    s.is_loading = false;
                    s.is_error = true;
                    s.search_result = None;
                });
                self.notify(Notice::CityNotFound);
            }
            FetchOutcome::NoNetwork => {
                self.apply(|s| {
                    s.is_loading = false;
                    s.is_error = true;
                });
                self.notify(Notice::NoConnectivity);
            }
        }
    }

    /// All state mutations funnel through here: serialized by the watch
    /// channel, suppressed entirely after teardown.
    fn apply(&self, mutate: impl FnOnce(&mut ViewState)) {
        if self.teardown.is_cancelled() {
            return;
        }
        self.state.send_modify(mutate);
    }

    fn notify(&self, notice: Notice) {
        if self.teardown.is_cancelled() {
            return;
        }
        // No subscribers is fine; notices are advisory.
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, CurrentConditions, LocationInfo};

    fn snapshot(name: &str) -> Snapshot {
        Snapshot {
            location: LocationInfo {
                name: name.to_string(),
                region: String::new(),
                country: String::new(),
                lat: 0.0,
                lon: 0.0,
                localtime: String::new(),
            },
            current: CurrentConditions {
                temp_c: 20.0,
                condition: Condition {
                    text: "Clear".to_string(),
                    icon: String::new(),
                },
                humidity: 40,
                uv: 2.0,
                feels_like_c: 19.0,
            },
        }
    }

    #[test]
    fn test_display_defaults_to_empty() {
        assert_eq!(ViewState::default().display(), DisplayState::Empty);
    }

    #[test]
    fn test_display_loading_beats_everything() {
        let state = ViewState {
            is_loading: true,
            is_error: true,
            search_result: Some(snapshot("Paris")),
            selected: Some(snapshot("Tokyo")),
            ..Default::default()
        };
        assert_eq!(state.display(), DisplayState::Loading);
    }

    #[test]
    fn test_display_error_holds_until_success_clears_flag() {
        let state = ViewState {
            is_error: true,
            search_result: Some(snapshot("Paris")),
            ..Default::default()
        };
        // Success paths clear is_error; while it is set, Error wins.
        assert_eq!(state.display(), DisplayState::Error);
    }

    #[test]
    fn test_display_search_result_beats_selection() {
        let state = ViewState {
            search_result: Some(snapshot("Paris")),
            selected: Some(snapshot("Tokyo")),
            ..Default::default()
        };
        assert_eq!(state.display(), DisplayState::SearchResult(snapshot("Paris")));
    }

    #[test]
    fn test_display_selection_when_no_search_result() {
        let state = ViewState {
            selected: Some(snapshot("Tokyo")),
            ..Default::default()
        };
        assert_eq!(state.display(), DisplayState::Detail(snapshot("Tokyo")));
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(Notice::CityNotFound.user_message(), "City not found");
        assert_eq!(
            Notice::OfflineShowingSaved.user_message(),
            "Offline: Showing saved data"
        );
    }
}
