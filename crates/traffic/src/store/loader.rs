//! CSV ingest and normalization.
//!
//! The source file is a locale-specific CSV: `;` field delimiter, `,` as the
//! decimal separator, and an encoding that varies between exports (UTF-8 or a
//! Windows single-byte codepage). Malformed rows are skipped, never fatal;
//! only a missing file, an unreadable file, or zero valid rows fail the load.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime, Timelike};
use csv::StringRecord;

use crate::record::TrafficRecord;

/// Canonical column names after header normalization.
const COL_PROVINCE: &str = "PROVINCIA_C";
const COL_CITY: &str = "CIUDAD_OPER";
const COL_LOCATION: &str = "UBICACION_EXCESO";
const COL_LATITUDE: &str = "LATITUD";
const COL_LONGITUDE: &str = "LONGITUD";
const COL_SPEED: &str = "VELOCIDAD";
const COL_DATE: &str = "FECHA_ALERTA";
const COL_TIME: &str = "HORA_ALERTA";

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A whole-file load failure. Per-row and per-field problems never surface
/// here; they degrade the affected row or field instead.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV headers: {0}")]
    Header(#[from] csv::Error),

    #[error("no valid rows after parsing")]
    NoValidRows,
}

/// Read and parse the dataset file.
pub fn load_records(path: &Path) -> Result<Vec<TrafficRecord>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(&decode(&bytes))
}

/// Decode raw bytes, preferring strict UTF-8 and falling back to
/// Windows-1252. The upstream exports claim UTF-8, Latin-1, or CP1252;
/// under encoding_rs the latter two share the Windows-1252 decoder, and
/// since that decoder accepts every byte sequence the fallback always
/// produces text.
pub(crate) fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Parse decoded CSV text into records.
pub(crate) fn parse_records(text: &str) -> Result<Vec<TrafficRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns = column_index(reader.headers()?);
    let province_idx = columns.get(COL_PROVINCE).copied();
    let city_idx = columns.get(COL_CITY).copied();
    let location_idx = columns.get(COL_LOCATION).copied();
    let latitude_idx = columns.get(COL_LATITUDE).copied();
    let longitude_idx = columns.get(COL_LONGITUDE).copied();
    let speed_idx = columns.get(COL_SPEED).copied();
    let date_idx = columns.get(COL_DATE).copied();
    let time_idx = columns.get(COL_TIME).copied();

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        // A row without a numeric speed carries no signal for any query;
        // treat it as malformed.
        let Some(speed) = cell(&row, speed_idx).and_then(parse_decimal) else {
            skipped += 1;
            continue;
        };

        let date = cell(&row, date_idx)
            .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok());
        let hour = cell(&row, time_idx)
            .and_then(|raw| NaiveTime::parse_from_str(raw, TIME_FORMAT).ok())
            .map(|t| t.hour());

        records.push(TrafficRecord::from_parts(
            cell(&row, province_idx).unwrap_or_default(),
            cell(&row, city_idx).unwrap_or_default(),
            cell(&row, location_idx).unwrap_or_default(),
            cell(&row, latitude_idx).and_then(parse_decimal),
            cell(&row, longitude_idx).and_then(parse_decimal),
            speed,
            date,
            hour,
        ));
    }

    if skipped > 0 {
        log::debug!("skipped {skipped} malformed rows");
    }

    if records.is_empty() {
        return Err(LoadError::NoValidRows);
    }

    Ok(records)
}

/// Map canonical column names to positions. Duplicate headers keep the first
/// occurrence; unknown columns are simply never looked up.
fn column_index(headers: &StringRecord) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for (idx, raw) in headers.iter().enumerate() {
        columns.entry(canonical_header(raw)).or_insert(idx);
    }
    columns
}

/// Normalize a raw header: strip BOM and whitespace, uppercase, fold the
/// `_OPERADORA` suffix variant to `_OPER`, then apply the known-synonym
/// rename table.
fn canonical_header(raw: &str) -> String {
    let name = raw
        .trim()
        .trim_start_matches('\u{feff}')
        .to_uppercase()
        .replace("_OPERADORA", "_OPER");

    match name.as_str() {
        "PROVINCIA_OPER" => COL_PROVINCE.to_owned(),
        "IDENTIFICACION_OPER" => "IDENTIFICACION".to_owned(),
        "TIPO_OPER" => "TIPO_OPERACION".to_owned(),
        _ => name,
    }
}

fn cell<'a>(row: &'a StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| row.get(i)).filter(|s| !s.is_empty())
}

/// Parse a decimal-comma numeric cell. Non-numeric input is `None`, never an
/// error and never zero.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
PROVINCIA_OPERADORA;CIUDAD_OPERADORA;UBICACION_EXCESO;LATITUD;LONGITUD;VELOCIDAD;FECHA_ALERTA;HORA_ALERTA
MANABI;MANTA;AV. MALECON;-0,9677;-80,7089;120,5;14/03/2024;08:15:00
MANABI;MANTA;AV. MALECON;no-lat;-80,7089;110,0;31/02/2024;25:00:00
PICHINCHA;QUITO;AV. AMAZONAS;-0,1807;-78,4678;sin-dato;15/03/2024;14:05:00
PICHINCHA;QUITO;AV. AMAZONAS;-0,1807;-78,4678;105,0;15/03/2024;14:05:00
";

    #[test]
    fn test_parse_fixture() {
        let records = parse_records(FIXTURE).unwrap();

        // The row with a non-numeric speed is dropped entirely.
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.province, "MANABI");
        assert_eq!(first.city, "MANTA");
        assert_eq!(first.speed, 120.5);
        assert_eq!(first.latitude, Some(-0.9677));
        assert_eq!(first.longitude, Some(-80.7089));
        assert_eq!(first.hour, Some(8));
        assert_eq!(
            first.date,
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
    }

    #[test]
    fn test_bad_fields_degrade_without_dropping_the_row() {
        let records = parse_records(FIXTURE).unwrap();

        // Row 2: invalid latitude, impossible date, impossible time.
        let degraded = &records[1];
        assert_eq!(degraded.latitude, None);
        assert_eq!(degraded.longitude, Some(-80.7089));
        assert_eq!(degraded.date, None);
        assert_eq!(degraded.day_of_week, None);
        assert_eq!(degraded.hour, None);
        assert_eq!(degraded.speed, 110.0);
    }

    #[test]
    fn test_canonical_header_folding() {
        assert_eq!(canonical_header(" provincia_operadora "), "PROVINCIA_C");
        assert_eq!(canonical_header("CIUDAD_OPERADORA"), "CIUDAD_OPER");
        assert_eq!(canonical_header("IDENTIFICACION_OPER"), "IDENTIFICACION");
        assert_eq!(canonical_header("TIPO_OPER"), "TIPO_OPERACION");
        assert_eq!(canonical_header("\u{feff}VELOCIDAD"), "VELOCIDAD");
        // Unknown columns pass through normalized but unmapped.
        assert_eq!(canonical_header("columna_extra"), "COLUMNA_EXTRA");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // "CAÑAR" with 0xD1 for Ñ is invalid UTF-8.
        let bytes = b"PROVINCIA;VELOCIDAD\nCA\xD1AR;100,0\n";
        let text = decode(bytes);
        assert!(text.contains("CAÑAR"));

        // Plain ASCII stays borrowed UTF-8.
        assert!(matches!(decode(b"abc"), Cow::Borrowed("abc")));
    }

    #[test]
    fn test_missing_columns_degrade_gracefully() {
        let records = parse_records("VELOCIDAD;OTRA\n120,0;x\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "");
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].hour, None);
    }

    #[test]
    fn test_header_only_input_is_no_valid_rows() {
        let err = parse_records("PROVINCIA_C;VELOCIDAD\n").unwrap_err();
        assert!(matches!(err, LoadError::NoValidRows));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let text = "PROVINCIA_C;CIUDAD_OPER;VELOCIDAD\nGUAYAS;GUAYAQUIL;130,0\nGUAYAS\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 1);
    }
}
