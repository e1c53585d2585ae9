//! # prediruta-traffic
//!
//! Historical traffic query engine over Ecuador's speed-violation dataset.
//!
//! ## Features
//!
//! - **Tolerant CSV ingest**: `;`-delimited, decimal-comma, mixed encodings;
//!   malformed rows degrade instead of aborting the load
//! - **Load-once snapshot**: an immutable in-memory dataset behind an
//!   at-most-once store, safe for concurrent request handlers
//! - **Pure analytics**: per-city and per-hour statistics, proximity search,
//!   peak-hour detection, congestion levels
//! - **Velocity classifier**: turns historical *excess* speeds into
//!   defensible recommended speeds via zone classification and the legal
//!   limit table
//!
//! ## Example
//!
//! ```
//! use prediruta_traffic::prelude::*;
//! use chrono::NaiveDate;
//!
//! let record = TrafficRecord::from_parts(
//!     "MANABI",
//!     "MANTA",
//!     "AV. 4 DE NOVIEMBRE",
//!     Some(-0.9677),
//!     Some(-80.7089),
//!     120.0,
//!     NaiveDate::from_ymd_opt(2024, 3, 14),
//!     Some(8),
//! );
//!
//! let dataset = Dataset::from_records(vec![record]);
//!
//! let stats = dataset.stats_by_city("manta").unwrap();
//! assert_eq!(stats.total_records, 1);
//!
//! // Historical excess speeds map to a much lower recommended speed.
//! let rec = recommended_speed(stats.mean_speed, Some(VehicleClass::Liviano), 0.85);
//! assert!(rec.recommended < stats.mean_speed);
//! ```

pub mod classifier;
pub mod error;
pub mod query;
pub mod record;
pub mod store;

// Re-exports for convenience
pub mod prelude {
    pub use crate::classifier::{
        adjust_hourly, limit_for, recommended_speed, AdjustedHourly, Recommendation, SpeedLimit,
        VehicleClass, ZoneType, DEFAULT_SAFETY_FACTOR,
    };
    pub use crate::error::TrafficError;
    pub use crate::query::results::*;
    pub use crate::record::TrafficRecord;
    pub use crate::store::{Dataset, TrafficStore};
}

pub use prelude::*;
