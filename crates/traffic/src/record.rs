//! One row of the Ecuador speed-violation dataset.
//!
//! Records are fixed structs with named optional fields: a field that fails
//! to parse at load time is `None`, and the record survives.

use chrono::{Datelike, NaiveDate};
use geo::Point;

/// A single speed-violation record.
///
/// `speed` is the recorded *excess* speed in km/h (historically ~100-149),
/// not a safe or recommended speed. The `day_of_week` and `month` fields are
/// derived from `date` once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficRecord {
    pub province: String,
    pub city: String,
    /// Free-text description of where the excess was recorded.
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Recorded excess speed in km/h.
    pub speed: f64,
    pub date: Option<NaiveDate>,
    /// Hour of day, 0-23.
    pub hour: Option<u32>,
    /// Monday = 0, Sunday = 6.
    pub day_of_week: Option<u32>,
    /// Calendar month, 1-12.
    pub month: Option<u32>,
}

impl TrafficRecord {
    /// Build a record, deriving `day_of_week` and `month` from `date`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        province: impl Into<String>,
        city: impl Into<String>,
        location: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        speed: f64,
        date: Option<NaiveDate>,
        hour: Option<u32>,
    ) -> Self {
        Self {
            province: province.into(),
            city: city.into(),
            location: location.into(),
            latitude,
            longitude,
            speed,
            day_of_week: date.map(|d| d.weekday().num_days_from_monday()),
            month: date.map(|d| d.month()),
            date,
            hour,
        }
    }

    /// Coordinates as a `geo::Point` (x = longitude, y = latitude), if both
    /// are known.
    pub fn position(&self) -> Option<Point> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Point::new(lon, lat)),
            _ => None,
        }
    }
}
