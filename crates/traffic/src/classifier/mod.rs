//! Velocity classifier: derive recommended safe speeds from historical
//! excess-speed data.
//!
//! The dataset's `speed` values are enforcement-recorded *excess* speeds
//! (~100-149 km/h), not speeds anyone should drive. This module inverts
//! them: classify a zone type from the historical mean, look up the legal
//! limit for that zone and vehicle class, and derive a display-ready
//! recommended speed with a safety margin.

pub mod limits;

pub use limits::{limit_for, SpeedLimit};

use serde::Serialize;

use crate::query::results::HourlyStat;
use crate::query::round1;

/// Reduction applied to the legal mean limit (0.85 = 15% below the limit).
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.85;

/// Hours with the heaviest traffic; recommended speeds drop a further 15%.
const PEAK_HOURS: [u32; 9] = [7, 8, 9, 12, 13, 14, 18, 19, 20];
/// Shoulder hours around the peaks; a milder 5% reduction.
const TRANSITION_HOURS: [u32; 7] = [10, 11, 15, 16, 17, 21, 22];

/// Road-zone type inferred from historical speed magnitude.
///
/// A heuristic proxy, not a measured fact: zones where recorded excess
/// speeds run higher are assumed to be higher-speed-limit road classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneType {
    Urbana,
    Perimetral,
    Carretera,
    Autopista,
}

impl ZoneType {
    /// Fixed thresholds over the historical mean speed: `<70` urbana,
    /// `<90` perimetral, `<110` carretera, else autopista.
    pub fn classify(historical_mean: f64) -> Self {
        if historical_mean < 70.0 {
            Self::Urbana
        } else if historical_mean < 90.0 {
            Self::Perimetral
        } else if historical_mean < 110.0 {
            Self::Carretera
        } else {
            Self::Autopista
        }
    }

    /// Human-readable description for display.
    pub fn description(self) -> &'static str {
        match self {
            Self::Urbana => "Zona Urbana (Avenidas principales)",
            Self::Perimetral => "Vía Perimetral (Autopistas urbanas)",
            Self::Carretera => "Carretera Interprovincial",
            Self::Autopista => "Autopista de Alta Velocidad",
        }
    }
}

/// Vehicle class the legal-limit table distinguishes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VehicleClass {
    Liviano,
    Pesado,
}

/// Explainable recommended-speed derivation for one historical mean.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "velocidad_recomendada")]
    pub recommended: f64,
    #[serde(rename = "velocidad_minima")]
    pub min: f64,
    #[serde(rename = "velocidad_maxima")]
    pub max: f64,
    #[serde(rename = "limite_legal")]
    pub legal_limit: f64,
    #[serde(rename = "tipo_zona")]
    pub zone: ZoneType,
    #[serde(rename = "velocidad_historica")]
    pub historical_speed: f64,
    #[serde(rename = "factor_seguridad")]
    pub safety_factor: f64,
}

/// Derive a recommended safe speed from a historical mean.
///
/// `recommended = legal mean limit x safety_factor`, rounded to 1 decimal.
/// Pass `None` for the vehicle class when the caller's input did not parse;
/// the limit lookup falls back to its default row rather than failing.
pub fn recommended_speed(
    historical_mean: f64,
    vehicle: Option<VehicleClass>,
    safety_factor: f64,
) -> Recommendation {
    let zone = ZoneType::classify(historical_mean);
    let limit = limit_for(zone, vehicle);

    Recommendation {
        recommended: round1(limit.promedio * safety_factor),
        min: limit.min,
        max: limit.max,
        legal_limit: limit.promedio,
        zone,
        historical_speed: historical_mean,
        safety_factor,
    }
}

/// One hourly entry with the historical speed replaced by a time-of-day
/// adjusted recommendation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdjustedHourly {
    #[serde(rename = "hora")]
    pub hour: String,
    #[serde(rename = "velocidad")]
    pub speed: f64,
    #[serde(rename = "confianza")]
    pub confidence: f64,
    #[serde(rename = "limite_legal")]
    pub legal_limit: f64,
    #[serde(rename = "tipo_zona")]
    pub zone: ZoneType,
}

/// Convert historical per-hour means into recommended speeds, applying the
/// hour-of-day multiplier on top of the base recommendation.
///
/// Peak hours compound the base 0.85 safety factor with a further 0.85;
/// this double reduction is intentional, inherited from the source design.
pub fn adjust_hourly(
    hourly: &[HourlyStat],
    vehicle: Option<VehicleClass>,
) -> Vec<AdjustedHourly> {
    hourly
        .iter()
        .map(|item| {
            let base = recommended_speed(item.mean_speed, vehicle, DEFAULT_SAFETY_FACTOR);
            // Entries come from `stats_by_hour`, always formatted "HH:00".
            let hour: u32 = item
                .hour
                .split(':')
                .next()
                .and_then(|h| h.parse().ok())
                .unwrap_or(0);

            AdjustedHourly {
                hour: item.hour.clone(),
                speed: round1(base.recommended * hour_factor(hour)),
                confidence: item.confidence,
                legal_limit: base.legal_limit,
                zone: base.zone,
            }
        })
        .collect()
}

fn hour_factor(hour: u32) -> f64 {
    if PEAK_HOURS.contains(&hour) {
        0.85
    } else if TRANSITION_HOURS.contains(&hour) {
        0.95
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::str::FromStr;

    #[test]
    fn test_zone_thresholds_are_exclusive_upper_bounds() {
        assert_eq!(ZoneType::classify(69.9), ZoneType::Urbana);
        assert_eq!(ZoneType::classify(70.0), ZoneType::Perimetral);
        assert_eq!(ZoneType::classify(89.9), ZoneType::Perimetral);
        assert_eq!(ZoneType::classify(90.0), ZoneType::Carretera);
        assert_eq!(ZoneType::classify(110.0), ZoneType::Autopista);
        assert_eq!(ZoneType::classify(149.0), ZoneType::Autopista);
    }

    #[test]
    fn test_recommended_speed_per_zone() {
        let urbana = recommended_speed(60.0, Some(VehicleClass::Liviano), 0.85);
        assert_eq!(urbana.zone, ZoneType::Urbana);
        assert_relative_eq!(urbana.legal_limit, 55.0);
        assert_relative_eq!(urbana.recommended, 46.7);

        let pesado = recommended_speed(80.0, Some(VehicleClass::Pesado), 0.85);
        assert_eq!(pesado.zone, ZoneType::Perimetral);
        assert_relative_eq!(pesado.recommended, 55.2);

        let autopista = recommended_speed(120.0, Some(VehicleClass::Liviano), 0.85);
        assert_eq!(autopista.zone, ZoneType::Autopista);
        assert_relative_eq!(autopista.recommended, 85.0);
        assert_relative_eq!(autopista.historical_speed, 120.0);
        assert_relative_eq!(autopista.safety_factor, 0.85);
    }

    #[test]
    fn test_unknown_vehicle_class_falls_back_to_default_limits() {
        let rec = recommended_speed(60.0, None, 0.85);
        assert_relative_eq!(rec.legal_limit, 70.0);
        assert_relative_eq!(rec.min, 50.0);
        assert_relative_eq!(rec.max, 90.0);
        assert_relative_eq!(rec.recommended, 59.5);
    }

    #[test]
    fn test_recommended_speed_monotonic_and_below_limit() {
        // Fixed class, rising historical mean across all four zones.
        let histories = [60.0, 80.0, 100.0, 120.0];
        let recs: Vec<Recommendation> = histories
            .iter()
            .map(|&h| recommended_speed(h, Some(VehicleClass::Liviano), 0.85))
            .collect();

        for pair in recs.windows(2) {
            assert!(pair[1].recommended > pair[0].recommended);
            assert!(pair[1].legal_limit > pair[0].legal_limit);
        }
        for rec in &recs {
            assert!(rec.recommended <= rec.legal_limit);
        }
    }

    #[test]
    fn test_adjust_hourly_factors() {
        let hourly = vec![
            HourlyStat {
                hour: "08:00".into(),
                mean_speed: 120.0,
                records: 40,
                confidence: 0.4,
            },
            HourlyStat {
                hour: "10:00".into(),
                mean_speed: 120.0,
                records: 40,
                confidence: 0.4,
            },
            HourlyStat {
                hour: "23:00".into(),
                mean_speed: 120.0,
                records: 40,
                confidence: 0.4,
            },
        ];

        let adjusted = adjust_hourly(&hourly, Some(VehicleClass::Liviano));
        assert_eq!(adjusted.len(), 3);

        // autopista base: 100 * 0.85 = 85.0, then the hour multiplier; the
        // peak-hour entry compounds the two factors.
        assert_eq!(adjusted[0].hour, "08:00");
        assert_relative_eq!(adjusted[0].speed, 72.2);
        assert_relative_eq!(adjusted[1].speed, 80.7);
        assert_relative_eq!(adjusted[2].speed, 85.0);

        assert_eq!(adjusted[0].zone, ZoneType::Autopista);
        assert_relative_eq!(adjusted[0].legal_limit, 100.0);
        assert_relative_eq!(adjusted[0].confidence, 0.4);
    }

    #[test]
    fn test_vehicle_class_parses_case_insensitively() {
        assert_eq!(
            VehicleClass::from_str("liviano").ok(),
            Some(VehicleClass::Liviano)
        );
        assert_eq!(
            VehicleClass::from_str("PESADO").ok(),
            Some(VehicleClass::Pesado)
        );
        assert_eq!(VehicleClass::from_str("bicicleta").ok(), None);
        assert_eq!(VehicleClass::Liviano.to_string(), "liviano");
    }

    #[test]
    fn test_zone_descriptions() {
        assert_eq!(
            ZoneType::Urbana.description(),
            "Zona Urbana (Avenidas principales)"
        );
        assert_eq!(ZoneType::Autopista.to_string(), "autopista");
    }
}
