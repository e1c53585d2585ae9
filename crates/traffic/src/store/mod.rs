//! Immutable dataset snapshot and the load-once record store.

pub mod loader;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::{Result, TrafficError};
use crate::query::results::*;
use crate::record::TrafficRecord;

// ============================================================================
// Dataset Snapshot
// ============================================================================

/// An immutable-after-load collection of [`TrafficRecord`]s.
///
/// No derived indices are kept; every query computes fresh aggregates, so all
/// operations are safe to call concurrently through a shared `Arc<Dataset>`.
#[derive(Clone, Debug)]
pub struct Dataset {
    records: Vec<TrafficRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<TrafficRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TrafficRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Traffic Store
// ============================================================================

/// Service object owning the one-time dataset load.
///
/// Constructed once at startup and handed by reference to request handlers.
/// The snapshot slot is a `OnceLock`, so concurrent first access performs the
/// load exactly once; after that the store is read-only. A failed load is
/// cached too — "refresh" semantics require a new store.
pub struct TrafficStore {
    path: PathBuf,
    snapshot: OnceLock<Option<Arc<Dataset>>>,
}

impl TrafficStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the dataset if it has not been attempted yet.
    ///
    /// Returns `true` iff a snapshot with at least one record exists. Repeat
    /// calls are idempotent: they return the cached outcome without touching
    /// the filesystem again.
    pub fn load(&self) -> bool {
        self.snapshot
            .get_or_init(|| match loader::load_records(&self.path) {
                Ok(records) => {
                    let dataset = Dataset::from_records(records);
                    log::info!(
                        "dataset loaded: {} records, {} provinces, {} cities",
                        dataset.len(),
                        dataset.provincias().len(),
                        dataset.ciudades(None).len(),
                    );
                    Some(Arc::new(dataset))
                }
                Err(err) => {
                    log::warn!("dataset load failed ({}): {err}", self.path.display());
                    None
                }
            })
            .is_some()
    }

    /// `true` iff [`load`](Self::load) succeeded with at least one record.
    pub fn is_loaded(&self) -> bool {
        matches!(self.snapshot.get(), Some(Some(_)))
    }

    /// The loaded snapshot, or `NotLoaded` when no load succeeded (callers
    /// map this to a 503, distinct from the 404 of the not-found variants).
    pub fn dataset(&self) -> Result<Arc<Dataset>> {
        self.snapshot
            .get()
            .and_then(Clone::clone)
            .ok_or(TrafficError::NotLoaded)
    }

    // ------------------------------------------------------------------
    // Query delegation: every operation checks the loaded state first.
    // ------------------------------------------------------------------

    pub fn provincias(&self) -> Result<Vec<String>> {
        Ok(self.dataset()?.provincias())
    }

    pub fn ciudades(&self, provincia: Option<&str>) -> Result<Vec<String>> {
        Ok(self.dataset()?.ciudades(provincia))
    }

    pub fn ciudades_detalle(&self, provincia: Option<&str>) -> Result<Vec<CityEntry>> {
        Ok(self.dataset()?.ciudades_detalle(provincia))
    }

    pub fn stats_by_city(&self, city: &str) -> Result<CityStats> {
        self.dataset()?.stats_by_city(city)
    }

    pub fn stats_by_hour(&self, city: Option<&str>) -> Result<Vec<HourlyStat>> {
        Ok(self.dataset()?.stats_by_hour(city))
    }

    pub fn nearby(&self, lat: f64, lon: f64, radius_km: f64) -> Result<Vec<NearbySpot>> {
        Ok(self.dataset()?.nearby(lat, lon, radius_km))
    }

    pub fn peak_hours(&self, city: Option<&str>) -> Result<PeakHours> {
        self.dataset()?.peak_hours(city)
    }

    pub fn summary(&self) -> Result<DatasetSummary> {
        Ok(self.dataset()?.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "prediruta-{}-{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_stays_not_loaded() {
        let store = TrafficStore::new("/nonexistent/trafico_ecuador.csv");

        assert!(!store.load());
        assert!(!store.is_loaded());
        assert!(matches!(
            store.stats_by_city("MANTA"),
            Err(TrafficError::NotLoaded)
        ));
        assert!(matches!(store.summary(), Err(TrafficError::NotLoaded)));
    }

    #[test]
    fn test_load_is_idempotent() {
        let path = temp_csv(
            "idempotent",
            "PROVINCIA_C;CIUDAD_OPER;VELOCIDAD\nGUAYAS;GUAYAQUIL;130,0\nGUAYAS;DURAN;120,0\n",
        );

        let store = TrafficStore::new(&path);
        assert!(store.load());
        let first = store.dataset().unwrap().len();
        assert!(store.load());
        let second = store.dataset().unwrap().len();

        assert!(store.is_loaded());
        assert_eq!(first, 2);
        assert_eq!(first, second);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_unloaded_until_load_called() {
        let store = TrafficStore::new("anywhere.csv");
        assert!(!store.is_loaded());
        assert!(matches!(store.dataset(), Err(TrafficError::NotLoaded)));
    }
}
