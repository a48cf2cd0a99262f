//! Fetch coordination between the connectivity gate, the remote provider and
//! the local observation store.

use std::sync::Arc;

use crate::connectivity::ConnectivityGate;
use crate::error::{ProviderError, StoreError};
use crate::provider::WeatherProvider;
use crate::store::ObservationStore;
use crate::types::{Observation, Snapshot};

/// Tagged result of one fetch attempt. Never a raw error: every call site
/// gets one of these, and each maps to exactly one user-visible reaction.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The remote call succeeded. `save_warning` is set when the follow-up
    /// cache write failed; the snapshot is still usable for display.
    Fetched {
        snapshot: Snapshot,
        save_warning: Option<StoreError>,
    },
    /// The connectivity gate reported no viable network; the cache was not
    /// touched.
    NoNetwork,
    /// The remote call failed (transport, status, or schema). The cache was
    /// not mutated.
    RemoteFailure(ProviderError),
}

/// Coordinates fetch/fallback for observations.
pub struct WeatherRepository {
    provider: WeatherProvider,
    store: Arc<ObservationStore>,
    gate: Arc<dyn ConnectivityGate>,
}

impl WeatherRepository {
    pub fn new(
        provider: WeatherProvider,
        store: Arc<ObservationStore>,
        gate: Arc<dyn ConnectivityGate>,
    ) -> Self {
        Self {
            provider,
            store,
            gate,
        }
    }

    /// Fetch current weather for a non-empty location query.
    ///
    /// Gate first: with no network the cache is left untouched. On success
    /// the observation is cached under the canonical location name returned
    /// by the provider, not the raw query.
    pub async fn fetch_observation(&self, query: &str) -> FetchOutcome {
        if !self.gate.is_reachable() {
            tracing::info!(query, "Skipping fetch: network unreachable");
            return FetchOutcome::NoNetwork;
        }

        let snapshot = match self.provider.fetch_by_query(query).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(query, "Weather fetch failed: {}", e);
                return FetchOutcome::RemoteFailure(e);
            }
        };

        let save_warning = match self.store.put(&Observation::from_snapshot(&snapshot)) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    location = %snapshot.location.name,
                    "Fetched weather could not be cached: {}",
                    e
                );
                Some(e)
            }
        };

        FetchOutcome::Fetched {
            snapshot,
            save_warning,
        }
    }

    /// Persist a snapshot the user committed to (selected a search result).
    pub fn select_as_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.store.put(&Observation::from_snapshot(snapshot))
    }

    /// The most recently written observation across all keys, if any.
    ///
    /// Store failures propagate; they are not collapsed into "nothing saved".
    pub fn load_last_known(&self) -> Result<Option<Observation>, StoreError> {
        self.store.most_recently_written()
    }

    /// Whether outbound calls are currently viable.
    pub fn is_network_reachable(&self) -> bool {
        self.gate.is_reachable()
    }
}
