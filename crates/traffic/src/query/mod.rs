//! Analytical queries over the dataset snapshot.
//!
//! All operations are pure functions of the immutable [`Dataset`] snapshot:
//! nothing here mutates shared state, so concurrent callers need no locking.
//!
//! [`Dataset`]: crate::store::Dataset

pub mod engine;
pub mod results;

pub use results::*;

/// Round to 1 decimal place (half away from zero).
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
