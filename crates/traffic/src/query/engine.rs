//! Query engine operations.
//!
//! Grouping conventions shared by every operation:
//!
//! - city/province matching is case-insensitive exact (Unicode uppercase,
//!   matching the accented names in the dataset);
//! - empty group keys (missing city, province, location) are excluded from
//!   group sets rather than forming a group of their own;
//! - records missing the grouped field (e.g. hour) are excluded from that
//!   grouping only, never from the snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{Result, TrafficError};
use crate::query::results::*;
use crate::query::{round1, round2};
use crate::record::TrafficRecord;
use crate::store::Dataset;

/// Degree-box approximation for proximity search: 1 degree ~ 111 km.
///
/// Deliberately not Haversine. The box is a square, not a circle, and the
/// conversion ignores latitude; acceptable for the small radii and
/// near-equatorial latitudes this dataset covers.
const KM_PER_DEGREE: f64 = 111.0;

impl Dataset {
    /// Distinct provinces, alphabetical.
    pub fn provincias(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .records()
            .iter()
            .map(|r| r.province.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        set.into_iter().map(str::to_owned).collect()
    }

    /// Distinct cities, alphabetical, optionally filtered by province.
    pub fn ciudades(&self, provincia: Option<&str>) -> Vec<String> {
        let wanted = provincia.map(str::to_uppercase);
        let set: BTreeSet<&str> = self
            .records()
            .iter()
            .filter(|r| match &wanted {
                Some(p) => r.province.to_uppercase() == *p,
                None => true,
            })
            .map(|r| r.city.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        set.into_iter().map(str::to_owned).collect()
    }

    /// Cities with their province and record count, busiest first.
    /// Ties keep alphabetical order (stable sort over the sorted city list).
    pub fn ciudades_detalle(&self, provincia: Option<&str>) -> Vec<CityEntry> {
        let mut entries: Vec<CityEntry> = self
            .ciudades(provincia)
            .into_iter()
            .map(|name| {
                let wanted = name.to_uppercase();
                let mut records = 0usize;
                let mut province = String::new();
                for r in self.city_records(&wanted) {
                    if records == 0 {
                        province = r.province.clone();
                    }
                    records += 1;
                }
                CityEntry {
                    name,
                    province,
                    records,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.records.cmp(&a.records));
        entries
    }

    /// Aggregate statistics for one city (case-insensitive exact match).
    pub fn stats_by_city(&self, city: &str) -> Result<CityStats> {
        let wanted = city.to_uppercase();
        let rows: Vec<&TrafficRecord> = self.city_records(&wanted).collect();

        if rows.is_empty() {
            return Err(TrafficError::CityNotFound(city.to_owned()));
        }

        let total = rows.len();
        let sum: f64 = rows.iter().map(|r| r.speed).sum();
        let max = rows.iter().map(|r| r.speed).fold(f64::NEG_INFINITY, f64::max);
        let min = rows.iter().map(|r| r.speed).fold(f64::INFINITY, f64::min);

        let locations: HashSet<&str> = rows
            .iter()
            .map(|r| r.location.as_str())
            .filter(|l| !l.is_empty())
            .collect();

        let mut seen = HashSet::new();
        let mut provinces = Vec::new();
        for r in &rows {
            if !r.province.is_empty() && seen.insert(r.province.as_str()) {
                provinces.push(r.province.clone());
            }
        }

        Ok(CityStats {
            city: city.to_owned(),
            total_records: total,
            mean_speed: round2(sum / total as f64),
            max_speed: max,
            min_speed: min,
            locations: locations.len(),
            provinces,
        })
    }

    /// Mean speed per hour of day, hour ascending. Records without a
    /// parseable hour are excluded; empty when no hour data exists.
    pub fn stats_by_hour(&self, city: Option<&str>) -> Vec<HourlyStat> {
        self.hourly_means(city)
            .into_iter()
            .map(|(hour, mean, count)| HourlyStat {
                hour: format_hour(hour),
                mean_speed: round1(mean),
                records: count,
                confidence: (count as f64 / 100.0).min(1.0),
            })
            .collect()
    }

    /// Records within a degree box around `(lat, lon)`, grouped by distinct
    /// `(location, lat, lon)`. Empty when nothing falls inside the box.
    pub fn nearby(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<NearbySpot> {
        let delta = radius_km / KM_PER_DEGREE;

        // Key on coordinate bit patterns: grouping wants exact float
        // identity, same as the upstream tabular group-by.
        let mut groups: HashMap<(String, u64, u64), (f64, usize)> = HashMap::new();
        for r in self.records() {
            let Some(p) = r.position() else { continue };
            if r.location.is_empty() {
                continue;
            }
            // Inclusive bounds on both axes independently.
            if (p.y() - lat).abs() <= delta && (p.x() - lon).abs() <= delta {
                let key = (r.location.clone(), p.y().to_bits(), p.x().to_bits());
                let entry = groups.entry(key).or_insert((0.0, 0));
                entry.0 += r.speed;
                entry.1 += 1;
            }
        }

        let mut spots: Vec<NearbySpot> = groups
            .into_iter()
            .map(|((location, lat_bits, lon_bits), (sum, count))| {
                let mean = sum / count as f64;
                NearbySpot {
                    location,
                    lat: f64::from_bits(lat_bits),
                    lon: f64::from_bits(lon_bits),
                    mean_speed: round1(mean),
                    records: count,
                    traffic_level: TrafficLevel::classify(mean, 50.0),
                }
            })
            .collect();
        spots.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then(a.lat.total_cmp(&b.lat))
                .then(a.lon.total_cmp(&b.lon))
        });
        spots
    }

    /// The 3 slowest (peak) and 3 fastest (free-flowing) hours.
    ///
    /// Selection is a stable sort of the hour-ascending grouping by mean
    /// speed, so ties break toward the earlier hour.
    pub fn peak_hours(&self, city: Option<&str>) -> Result<PeakHours> {
        let hourly = self.hourly_means(city);
        if hourly.is_empty() {
            return Err(TrafficError::NoHourData);
        }

        let mut slowest: Vec<(u32, f64)> =
            hourly.iter().map(|&(h, mean, _)| (h, mean)).collect();
        slowest.sort_by(|a, b| a.1.total_cmp(&b.1));
        slowest.truncate(3);

        let mut fastest: Vec<(u32, f64)> =
            hourly.iter().map(|&(h, mean, _)| (h, mean)).collect();
        fastest.sort_by(|a, b| b.1.total_cmp(&a.1));
        fastest.truncate(3);

        let mean_of = |hours: &[(u32, f64)]| {
            round1(hours.iter().map(|(_, m)| m).sum::<f64>() / hours.len() as f64)
        };

        Ok(PeakHours {
            peak_speed: mean_of(&slowest),
            free_speed: mean_of(&fastest),
            peak_hours: slowest.into_iter().map(|(h, _)| format_hour(h)).collect(),
            free_hours: fastest.into_iter().map(|(h, _)| format_hour(h)).collect(),
        })
    }

    /// Whole-dataset overview.
    pub fn summary(&self) -> DatasetSummary {
        let provinces = self.provincias();
        let province_count = provinces.len();
        let city_count = self.ciudades(None).len();

        let dates: Vec<_> = self.records().iter().filter_map(|r| r.date).collect();
        let date_range = DateRange {
            start: dates.iter().min().map(|d| d.format("%Y-%m-%d").to_string()),
            end: dates.iter().max().map(|d| d.format("%Y-%m-%d").to_string()),
        };

        let total = self.len();
        let sum: f64 = self.records().iter().map(|r| r.speed).sum();
        let max = self
            .records()
            .iter()
            .map(|r| r.speed)
            .fold(f64::NEG_INFINITY, f64::max);
        let min = self
            .records()
            .iter()
            .map(|r| r.speed)
            .fold(f64::INFINITY, f64::min);

        DatasetSummary {
            total_records: total,
            provinces,
            province_count,
            city_count,
            date_range,
            speed_stats: SpeedStats {
                mean: round1(sum / total as f64),
                max: max as i64,
                min: min as i64,
            },
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn city_records<'a>(
        &'a self,
        city_upper: &'a str,
    ) -> impl Iterator<Item = &'a TrafficRecord> + 'a {
        self.records()
            .iter()
            .filter(move |r| r.city.to_uppercase() == city_upper)
    }

    /// `(hour, mean speed, record count)` per hour, hour ascending,
    /// optionally filtered to one city.
    fn hourly_means(&self, city: Option<&str>) -> Vec<(u32, f64, usize)> {
        let wanted = city.map(str::to_uppercase);
        let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for r in self.records() {
            if let Some(p) = &wanted {
                if r.city.to_uppercase() != *p {
                    continue;
                }
            }
            let Some(hour) = r.hour else { continue };
            let entry = groups.entry(hour).or_insert((0.0, 0));
            entry.0 += r.speed;
            entry.1 += 1;
        }
        groups
            .into_iter()
            .map(|(hour, (sum, count))| (hour, sum / count as f64, count))
            .collect()
    }
}

fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}
