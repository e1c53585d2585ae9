//! Query-level errors.
//!
//! "Not loaded" and "not found" are values, not panics: HTTP callers map
//! `NotLoaded` to 503 and the not-found variants to 404.

/// Errors returned by [`TrafficStore`](crate::store::TrafficStore) queries.
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    /// The dataset file was missing or unparseable; no snapshot exists.
    #[error("dataset not loaded")]
    NotLoaded,

    /// A city-scoped query matched zero records.
    #[error("no data for city: {0}")]
    CityNotFound(String),

    /// An hour-grouped query found no records with a parseable hour.
    #[error("no hourly data available")]
    NoHourData,
}

pub type Result<T> = std::result::Result<T, TrafficError>;
