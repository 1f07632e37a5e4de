//! ### Convert
//! Reading and writing the CSV files the scenario runs operate against.
//! Market-data exports are pandas `to_csv` dumps: a header row, the
//! timestamp in the first column and the value in the second.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::series::{LoadSeries, PricePoint, PriceSeries};

const PANDAS_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceCsvRow {
    pub timestamp: String,
    pub price: f64,
}

/// Accepts both RFC 3339 and the space-separated form pandas writes.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, PANDAS_TIMESTAMP))
        .map_err(Error::from)
}

pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(PANDAS_TIMESTAMP).to_string()
}

/// Writes through a temporary file next to `output` and renames it into
/// place, so a failed write leaves no partial file behind.
pub fn write_csv_atomic(
    output: &Path,
    fill: impl FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> Result<()>,
) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out_csv = csv::Writer::from_writer(&mut tmp);
        fill(&mut out_csv)?;
        out_csv.flush()?;
    }
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}

/// Reads (timestamp, value) pairs by position, ignoring the header names and
/// any columns past the second.
pub fn read_export_rows(input: &Path) -> Result<Vec<(DateTime<FixedOffset>, f64)>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(input)?;
    let mut rows = Vec::new();
    for (idx, line) in reader.records().enumerate() {
        let line = line?;
        let (Some(ts), Some(val)) = (line.get(0), line.get(1)) else {
            return Err(Error::invalid(format!(
                "{}: row {} has fewer than two columns: {line:?}",
                input.display(),
                idx + 1
            )));
        };
        let value = val.trim().parse::<f64>().map_err(|e| {
            Error::invalid(format!(
                "{}: row {} value {val:?}: {e}",
                input.display(),
                idx + 1
            ))
        })?;
        rows.push((parse_timestamp(ts)?, value));
    }
    Ok(rows)
}

pub fn read_price_csv(input: &Path) -> Result<PriceSeries> {
    let points = read_export_rows(input)?
        .into_iter()
        .map(|(timestamp, price)| PricePoint { timestamp, price })
        .collect();
    PriceSeries::new(points)
}

pub fn write_price_csv(output: &Path, prices: &PriceSeries) -> Result<()> {
    write_csv_atomic(output, |out_csv| {
        for point in prices.points() {
            out_csv.serialize(&PriceCsvRow {
                timestamp: format_timestamp(&point.timestamp),
                price: point.price,
            })?;
        }
        Ok(())
    })
}

pub fn write_load_csv(output: &Path, load: &LoadSeries) -> Result<()> {
    write_csv_atomic(output, |out_csv| {
        out_csv.write_record(["timestamp", "load"])?;
        for (ts, val) in &load.points {
            out_csv.write_record([format_timestamp(ts), val.to_string()])?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_both_timestamp_forms() {
        let a = parse_timestamp("2023-11-01 00:15:00+01:00").unwrap();
        let b = parse_timestamp("2023-11-01T00:15:00+01:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn reads_pandas_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            ",0\n2023-11-01 00:00:00+01:00,50.0\n2023-11-01 00:15:00+01:00,52.5\n",
        )
        .unwrap();

        let series = read_price_csv(&path).unwrap();
        assert_eq!(series.values(), vec![50.0, 52.5]);
    }

    #[test]
    fn price_csv_survives_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let series = crate::series::quarter_hours(&[50., 52., 48.]);

        write_price_csv(&path, &series).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("timestamp,price\n2023-11-01 00:00:00+01:00,50"));
        assert_eq!(read_price_csv(&path).unwrap(), series);
    }

    #[test]
    fn failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simuls.csv");

        let res = write_csv_atomic(&path, |out_csv| {
            out_csv.write_record(["index", "price"])?;
            Err(Error::invalid("disk full"))
        });

        assert!(res.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simuls.csv");
        fs::write(&path, "index,price\n0,50\n").unwrap();

        let res = write_csv_atomic(&path, |out_csv| {
            out_csv.write_record(["half"])?;
            Err(Error::invalid("disk full"))
        });

        assert!(res.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "index,price\n0,50\n");
    }

    #[test]
    fn reports_bad_value_with_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,price\n2023-11-01 00:00:00+01:00,n/a\n").unwrap();

        let err = read_price_csv(&path).unwrap_err();
        assert!(matches!(err, Error::InputValidation(msg) if msg.contains("row 1")));
    }
}
