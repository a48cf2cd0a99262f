//! Weather-crate error types.
//!
//! User-facing wording lives with the screen's [`Notice`](crate::Notice)
//! values; these types carry the technical cause for logging and matching.

use thiserror::Error;

/// Failures talking to the remote weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed provider payload: {0}")]
    Parse(String),
}

/// Failures in the local observation store.
///
/// Kept distinct from provider failures: fetched data may still be worth
/// showing even when it could not be saved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
