//! Weather tracking core for wxtrack
//!
//! Fetches current weather for a searched city via the WeatherAPI service,
//! caches the last observation per city in SQLite, and drives a single
//! screen's view state with offline fallback to the most recent observation.

pub mod connectivity;
pub mod error;
pub mod provider;
pub mod repository;
pub mod screen;
pub mod store;
pub mod types;

pub use connectivity::{ConnectivityGate, FixedGate, SystemGate};
pub use error::{ProviderError, StoreError};
pub use provider::WeatherProvider;
pub use repository::{FetchOutcome, WeatherRepository};
pub use screen::{DisplayState, Notice, ScreenModel, ViewState};
pub use store::ObservationStore;
pub use types::{Observation, Snapshot};
