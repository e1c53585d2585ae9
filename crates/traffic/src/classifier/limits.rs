//! Legal speed-limit reference table (Ecuadorian regulation).
//!
//! Configuration data, not derived from the dataset:
//! - urban zones: 50-60 km/h (light), 40-50 km/h (heavy)
//! - perimeter roads: 80-90 km/h (light), 60-70 km/h (heavy)
//! - straight highways: 90-100 km/h; curved sections: 50-60 km/h
//! - motorways: 90-120 km/h

use serde::Serialize;

use super::{VehicleClass, ZoneType};

/// One row of the legal-limit table, km/h.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpeedLimit {
    pub min: f64,
    pub max: f64,
    pub promedio: f64,
}

pub const URBANA_LIVIANO: SpeedLimit = SpeedLimit { min: 50.0, max: 60.0, promedio: 55.0 };
pub const URBANA_PESADO: SpeedLimit = SpeedLimit { min: 40.0, max: 50.0, promedio: 45.0 };
pub const PERIMETRAL_LIVIANO: SpeedLimit = SpeedLimit { min: 80.0, max: 90.0, promedio: 85.0 };
pub const PERIMETRAL_PESADO: SpeedLimit = SpeedLimit { min: 60.0, max: 70.0, promedio: 65.0 };
pub const CARRETERA_RECTA: SpeedLimit = SpeedLimit { min: 90.0, max: 100.0, promedio: 95.0 };
/// Curved-highway limit. Not reachable from [`limit_for`] (zone
/// classification cannot distinguish road geometry); kept for callers that
/// know the section is curved.
pub const CARRETERA_CURVA: SpeedLimit = SpeedLimit { min: 50.0, max: 60.0, promedio: 55.0 };
pub const AUTOPISTA: SpeedLimit = SpeedLimit { min: 90.0, max: 120.0, promedio: 100.0 };

/// Fallback entry for zone/class pairings without a dedicated table row.
pub const DEFAULT: SpeedLimit = SpeedLimit { min: 50.0, max: 90.0, promedio: 70.0 };

/// Select the legal-limit row for a zone and vehicle class.
///
/// `carretera` always maps to the straight-highway row and `autopista`
/// ignores the vehicle class entirely (heavy vehicles have no dedicated
/// override there). An unrecognized vehicle class (`None`, e.g. a string
/// that failed to parse at the API boundary) falls back to [`DEFAULT`]
/// in the class-specific zones. Never fails.
pub fn limit_for(zone: ZoneType, vehicle: Option<VehicleClass>) -> &'static SpeedLimit {
    use VehicleClass::*;
    use ZoneType::*;

    match (zone, vehicle) {
        (Urbana, Some(Liviano)) => &URBANA_LIVIANO,
        (Urbana, Some(Pesado)) => &URBANA_PESADO,
        (Perimetral, Some(Liviano)) => &PERIMETRAL_LIVIANO,
        (Perimetral, Some(Pesado)) => &PERIMETRAL_PESADO,
        (Carretera, _) => &CARRETERA_RECTA,
        (Autopista, _) => &AUTOPISTA,
        (Urbana | Perimetral, None) => &DEFAULT,
    }
}
