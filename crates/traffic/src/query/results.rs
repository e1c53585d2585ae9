//! JSON-facing result types for the query engine.
//!
//! Field names serialize to the Spanish wire contract the HTTP layer exposes
//! (`total_registros`, `velocidad_promedio`, ...). Only portable primitives
//! appear in the output.

use serde::Serialize;

/// Congestion level derived from a speed / speed-limit ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrafficLevel {
    Fluido,
    Moderado,
    Congestionado,
    Severo,
}

impl TrafficLevel {
    /// Four-bucket threshold ladder over `speed / speed_limit`, with
    /// inclusive lower bounds: >= 0.9 fluido, >= 0.6 moderado, >= 0.4
    /// congestionado, else severo.
    pub fn classify(speed: f64, speed_limit: f64) -> Self {
        let ratio = speed / speed_limit;
        if ratio >= 0.9 {
            Self::Fluido
        } else if ratio >= 0.6 {
            Self::Moderado
        } else if ratio >= 0.4 {
            Self::Congestionado
        } else {
            Self::Severo
        }
    }
}

/// Per-city aggregate statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CityStats {
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "velocidad_promedio")]
    pub mean_speed: f64,
    #[serde(rename = "velocidad_max")]
    pub max_speed: f64,
    #[serde(rename = "velocidad_min")]
    pub min_speed: f64,
    /// Count of distinct locations with at least one record.
    #[serde(rename = "ubicaciones")]
    pub locations: usize,
    /// Provinces the city appears under, in first-appearance order.
    #[serde(rename = "provincias")]
    pub provinces: Vec<String>,
}

/// One city in the enriched city listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CityEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "provincia")]
    pub province: String,
    #[serde(rename = "registros")]
    pub records: usize,
}

/// Aggregate statistics for one hour of the day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HourlyStat {
    /// Formatted `"HH:00"`.
    #[serde(rename = "hora")]
    pub hour: String,
    #[serde(rename = "velocidad_promedio")]
    pub mean_speed: f64,
    #[serde(rename = "registros")]
    pub records: usize,
    /// Sample-size heuristic: `min(1.0, records / 100)`. Not a statistical
    /// confidence interval.
    #[serde(rename = "confianza")]
    pub confidence: f64,
}

/// A distinct location aggregated from records near a query point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NearbySpot {
    #[serde(rename = "ubicacion")]
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "velocidad_promedio")]
    pub mean_speed: f64,
    #[serde(rename = "registros")]
    pub records: usize,
    #[serde(rename = "nivel_trafico")]
    pub traffic_level: TrafficLevel,
}

/// Slowest and fastest hours of the day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeakHours {
    /// The 3 hours with the lowest mean speed, formatted `"HH:00"`.
    #[serde(rename = "horas_pico")]
    pub peak_hours: Vec<String>,
    /// The 3 hours with the highest mean speed.
    #[serde(rename = "horas_fluidas")]
    pub free_hours: Vec<String>,
    /// Mean of the peak-hour means.
    #[serde(rename = "velocidad_pico")]
    pub peak_speed: f64,
    /// Mean of the free-hour means.
    #[serde(rename = "velocidad_fluida")]
    pub free_speed: f64,
}

/// First/last record date, as `YYYY-MM-DD` strings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DateRange {
    #[serde(rename = "inicio")]
    pub start: Option<String>,
    #[serde(rename = "fin")]
    pub end: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedStats {
    #[serde(rename = "promedio")]
    pub mean: f64,
    pub max: i64,
    pub min: i64,
}

/// Whole-dataset overview.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "provincias")]
    pub provinces: Vec<String>,
    #[serde(rename = "total_provincias")]
    pub province_count: usize,
    #[serde(rename = "total_ciudades")]
    pub city_count: usize,
    #[serde(rename = "rango_fechas")]
    pub date_range: DateRange,
    #[serde(rename = "velocidad_stats")]
    pub speed_stats: SpeedStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_level_boundaries() {
        // Thresholds are inclusive lower bounds.
        assert_eq!(TrafficLevel::classify(45.0, 50.0), TrafficLevel::Fluido);
        assert_eq!(TrafficLevel::classify(30.0, 50.0), TrafficLevel::Moderado);
        assert_eq!(
            TrafficLevel::classify(29.0, 50.0),
            TrafficLevel::Congestionado
        );
        assert_eq!(
            TrafficLevel::classify(20.0, 50.0),
            TrafficLevel::Congestionado
        );
        assert_eq!(TrafficLevel::classify(19.0, 50.0), TrafficLevel::Severo);
    }

    #[test]
    fn test_wire_names_are_spanish() {
        let stats = CityStats {
            city: "MANTA".into(),
            total_records: 2,
            mean_speed: 115.0,
            max_speed: 120.0,
            min_speed: 110.0,
            locations: 1,
            provinces: vec!["MANABI".into()],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_registros"], 2);
        assert_eq!(json["velocidad_promedio"], 115.0);
        assert_eq!(json["ubicaciones"], 1);

        let level = serde_json::to_value(TrafficLevel::Fluido).unwrap();
        assert_eq!(level, "fluido");
        assert_eq!(TrafficLevel::Severo.to_string(), "severo");
    }
}
