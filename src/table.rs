//! ### Table
//! Scenario outputs side by side on the time index of the source prices.
//! Scenarios are added by column, never by row.

use chrono::{DateTime, FixedOffset};
use std::path::Path;

use crate::convert::{format_timestamp, parse_timestamp, write_csv_atomic};
use crate::error::{Error, Result};
use crate::series::PriceSeries;

const FIXED_COLUMNS: [&str; 3] = ["index", "timestamp", "price"];

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    timestamps: Vec<DateTime<FixedOffset>>,
    prices: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl ScenarioTable {
    pub fn new(prices: &PriceSeries) -> Self {
        Self {
            timestamps: prices.timestamps(),
            prices: prices.values(),
            columns: Vec::new(),
        }
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.timestamps.len() {
            return Err(Error::invalid(format!(
                "column {name:?} has {} rows, table has {}",
                values.len(),
                self.timestamps.len()
            )));
        }
        if FIXED_COLUMNS.contains(&name.as_str()) || self.column(&name).is_some() {
            return Err(Error::invalid(format!("duplicate column {name:?}")));
        }
        self.columns.push((name, values));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<FixedOffset>] {
        &self.timestamps
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Scenario column names in insertion order, excluding `price`.
    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, values)| values.as_slice())
    }

    /// `(timestamp, value)` pairs of one scenario, for plotting.
    pub fn series(
        &self,
        name: &str,
    ) -> Option<impl Iterator<Item = (DateTime<FixedOffset>, f64)> + '_> {
        let values = self.column(name)?;
        Some(self.timestamps.iter().copied().zip(values.iter().copied()))
    }

    pub fn header(&self) -> Vec<&str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.scenario_names())
            .collect()
    }

    pub fn write_csv(&self, output: &Path) -> Result<()> {
        write_csv_atomic(output, |out_csv| {
            out_csv.write_record(self.header())?;
            for (row, ts) in self.timestamps.iter().enumerate() {
                let mut record =
                    vec![row.to_string(), format_timestamp(ts), self.prices[row].to_string()];
                record.extend(self.columns.iter().map(|(_, values)| values[row].to_string()));
                out_csv.write_record(&record)?;
            }
            Ok(())
        })
    }

    pub fn read_csv(input: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(input)?;
        let headers = reader.headers()?.clone();
        if headers.len() < FIXED_COLUMNS.len()
            || headers.iter().zip(FIXED_COLUMNS).any(|(got, want)| got != want)
        {
            return Err(Error::invalid(format!(
                "{}: expected header starting with {}, got {headers:?}",
                input.display(),
                FIXED_COLUMNS.join(",")
            )));
        }

        let names: Vec<String> = headers.iter().skip(FIXED_COLUMNS.len()).map(String::from).collect();
        let mut timestamps = Vec::new();
        let mut prices = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

        for (row, line) in reader.records().enumerate() {
            let line = line?;
            let parse = |col: usize| -> Result<f64> {
                line[col].trim().parse::<f64>().map_err(|e| {
                    Error::invalid(format!("{}: row {row} column {col}: {e}", input.display()))
                })
            };
            timestamps.push(parse_timestamp(&line[1])?);
            prices.push(parse(2)?);
            for (idx, column) in values.iter_mut().enumerate() {
                column.push(parse(FIXED_COLUMNS.len() + idx)?);
            }
        }

        let mut table = Self {
            timestamps,
            prices,
            columns: Vec::with_capacity(names.len()),
        };
        for (name, column) in names.into_iter().zip(values) {
            table.push_column(name, column)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::quarter_hours;

    #[test]
    fn keeps_insertion_order() {
        let mut table = ScenarioTable::new(&quarter_hours(&[50., 52., 48.]));
        table.push_column("zeta", vec![0.; 3]).unwrap();
        table.push_column("alpha", vec![1.; 3]).unwrap();
        assert_eq!(table.header(), vec!["index", "timestamp", "price", "zeta", "alpha"]);
    }

    #[test]
    fn rejects_misaligned_column() {
        let mut table = ScenarioTable::new(&quarter_hours(&[50., 52., 48.]));
        assert!(table.push_column("short", vec![0.; 2]).is_err());
        assert!(table.scenario_names().next().is_none());
    }

    #[test]
    fn rejects_duplicate_column() {
        let mut table = ScenarioTable::new(&quarter_hours(&[50.]));
        table.push_column("base", vec![0.]).unwrap();
        assert!(table.push_column("base", vec![1.]).is_err());
        assert!(table.push_column("price", vec![1.]).is_err());
    }

    #[test]
    fn series_pairs_timestamps() {
        let prices = quarter_hours(&[50., 52.]);
        let mut table = ScenarioTable::new(&prices);
        table.push_column("base", vec![3.3, 3.6]).unwrap();
        let pairs: Vec<_> = table.series("base").unwrap().collect();
        assert_eq!(pairs[1], (prices.points()[1].timestamp, 3.6));
        assert!(table.series("missing").is_none());
    }

    #[test]
    fn csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simuls.csv");
        let mut table = ScenarioTable::new(&quarter_hours(&[50., 52.5, 48.]));
        table.push_column("base", vec![0., 3.3, 3.6]).unwrap();
        table.push_column("low_min_tech", vec![0., 2., 2.3]).unwrap();

        table.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("index,timestamp,price,base,low_min_tech")
        );
        assert_eq!(ScenarioTable::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn unwritable_target_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("simuls.csv");
        let mut table = ScenarioTable::new(&quarter_hours(&[50.]));
        table.push_column("base", vec![0.]).unwrap();

        assert!(table.write_csv(&path).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn read_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "date,price\n2023-11-01 00:00:00+01:00,1\n").unwrap();
        assert!(ScenarioTable::read_csv(&path).is_err());
    }
}
