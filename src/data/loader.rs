//! CSV ingestion of the raw yearly series and their rescaling.
//!
//! Raw files are semicolon-separated and use decimal commas:
//!
//! | file         | column  | resolution |
//! |--------------|---------|------------|
//! | `PV.csv`     | `P_PV_` | hourly     |
//! | `Prices.csv` | `Price` | hourly     |
//! | `H4.csv`     | `Power` | per minute |

use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::store::TimeSeriesStore;
use crate::error::DataError;

/// PV file name inside the data directory.
pub const PV_FILE: &str = "PV.csv";
/// Price file name inside the data directory.
pub const PRICE_FILE: &str = "Prices.csv";
/// Demand file name inside the data directory.
pub const DEMAND_FILE: &str = "H4.csv";

/// Multiplier applied to raw PV generation.
pub const PV_SCALE: f32 = 200.0;
/// Divisor applied to raw prices.
pub const PRICE_DIVISOR: f32 = 10.0;
/// Lower bound for scaled prices.
pub const PRICE_FLOOR: f32 = 0.5;
/// Raw demand samples aggregated into one hour.
pub const DEMAND_SAMPLES_PER_HOUR: usize = 60;
/// Multiplier applied to each hourly demand sum.
pub const DEMAND_SCALE: f32 = 300.0;

/// Reads one numeric column from a semicolon-separated file with decimal commas.
///
/// # Errors
///
/// Returns a [`DataError`] if the file cannot be read, lacks `column`, or
/// contains a value that does not parse as a number.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<f32>, DataError> {
    let read_err = |source| DataError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(read_err)?;

    let idx = rdr
        .headers()
        .map_err(read_err)?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| DataError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(read_err)?;
        let raw = record.get(idx).unwrap_or("").trim();
        let value = raw
            .replace(',', ".")
            .parse::<f32>()
            .map_err(|_| DataError::Parse {
                path: path.to_path_buf(),
                row: row + 1,
                value: raw.to_string(),
            })?;
        values.push(value);
    }
    Ok(values)
}

/// Scales raw PV readings.
pub fn scale_pv(raw: &[f32]) -> Vec<f32> {
    raw.iter().map(|v| v * PV_SCALE).collect()
}

/// Scales raw prices, flooring the result at [`PRICE_FLOOR`].
pub fn scale_price(raw: &[f32]) -> Vec<f32> {
    raw.iter()
        .map(|v| {
            let p = v / PRICE_DIVISOR;
            if p <= PRICE_FLOOR { PRICE_FLOOR } else { p }
        })
        .collect()
}

/// Sums per-minute demand into hours and scales each hourly sum.
///
/// A trailing partial block is aggregated like a full one.
pub fn aggregate_demand(raw: &[f32]) -> Vec<f32> {
    raw.chunks(DEMAND_SAMPLES_PER_HOUR)
        .map(|block| block.iter().sum::<f32>() * DEMAND_SCALE)
        .collect()
}

/// Loads and scales a full year from `dir`.
///
/// # Errors
///
/// Any read, parse, or length problem is fatal and returned as a [`DataError`].
pub fn load_year(dir: &Path) -> Result<TimeSeriesStore, DataError> {
    let file = |name: &str| -> PathBuf { dir.join(name) };

    let pv = scale_pv(&read_column(&file(PV_FILE), "P_PV_")?);
    let price = scale_price(&read_column(&file(PRICE_FILE), "Price")?);
    let demand = aggregate_demand(&read_column(&file(DEMAND_FILE), "Power")?);

    let store = TimeSeriesStore::new(pv, price, demand)?;
    info!(dir = %dir.display(), "loaded yearly time series");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    #[test]
    fn reads_decimal_comma_column() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Prices.csv");
        fs::write(&path, "Date;Price\n2020-01-01;12,5\n2020-01-02;3\n").expect("write");

        let values = read_column(&path, "Price").expect("parse");
        assert_eq!(values, vec![12.5, 3.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("PV.csv");
        fs::write(&path, "Date;Other\n1;2\n").expect("write");

        let err = read_column(&path, "P_PV_").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn bad_number_reports_row() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("H4.csv");
        fs::write(&path, "Power\n1,0\nabc\n").expect("write");

        let err = read_column(&path, "Power").unwrap_err();
        assert!(matches!(err, DataError::Parse { row: 2, .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_year(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Read { .. }));
    }

    #[test]
    fn price_is_divided_and_floored() {
        let scaled = scale_price(&[100.0, 5.0, -20.0, 6.0]);
        assert_relative_eq!(scaled[0], 10.0);
        assert_relative_eq!(scaled[1], 0.5);
        assert_relative_eq!(scaled[2], 0.5);
        assert_relative_eq!(scaled[3], 0.6);
    }

    #[test]
    fn demand_sums_sixty_samples_per_hour() {
        let raw = vec![0.01; 120];
        let hourly = aggregate_demand(&raw);
        assert_eq!(hourly.len(), 2);
        assert_relative_eq!(hourly[0], 0.6 * 300.0, max_relative = 1e-4);
    }

    #[test]
    fn short_year_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(PV_FILE), "P_PV_\n0,1\n").expect("write");
        fs::write(dir.path().join(PRICE_FILE), "Price\n30\n").expect("write");
        fs::write(dir.path().join(DEMAND_FILE), "Power\n0,2\n").expect("write");

        let err = load_year(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::Length { .. }));
    }
}
