//! ### Market
//! Load and day-ahead price queries for a bidding zone over `[start, end)`.
//!
//! [`Archive`] answers them from exports already on disk under the
//! configured base directory:
//! - `<zone>_load.csv`
//! - `<zone>_day_ahead_<resolution>.csv`, e.g. `at_day_ahead_15min.csv`

use chrono::{DateTime, FixedOffset, TimeDelta};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::Config;
use crate::convert::read_export_rows;
use crate::error::{Error, Result};
use crate::series::{LoadSeries, PricePoint, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    QuarterHour,
    Hour,
}

impl Resolution {
    pub fn step(self) -> TimeDelta {
        match self {
            Self::QuarterHour => TimeDelta::minutes(15),
            Self::Hour => TimeDelta::hours(1),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::QuarterHour => "15min",
            Self::Hour => "60min",
        })
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "15min" | "15T" => Ok(Self::QuarterHour),
            "60min" | "60T" | "1h" => Ok(Self::Hour),
            other => Err(Error::invalid(format!(
                "unknown resolution {other:?}, expected 15min or 60min"
            ))),
        }
    }
}

/// Implementations take what they need from [`Config`] at construction.
/// A client for the remote transparency API would read `Config::api_key`;
/// [`Archive`] only reads `Config::base_dir` and never sees the token.
pub trait MarketData {
    fn query_load(
        &self,
        zone: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<LoadSeries>;

    fn query_day_ahead_prices(
        &self,
        zone: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        resolution: Resolution,
    ) -> Result<PriceSeries>;
}

/// Local exports under `Config::base_dir`. Needs no credentials.
pub struct Archive {
    dir: PathBuf,
}

impl Archive {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.base_dir.clone(),
        }
    }

    fn window(
        &self,
        file: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<(DateTime<FixedOffset>, f64)>> {
        if start >= end {
            return Err(Error::invalid(format!("empty window: {start} .. {end}")));
        }
        let path = self.dir.join(file);
        let rows: Vec<_> = read_export_rows(&path)?
            .into_iter()
            .filter(|(ts, _)| *ts >= start && *ts < end)
            .collect();
        if rows.is_empty() {
            return Err(Error::invalid(format!(
                "{} has no rows in {start} .. {end}",
                path.display()
            )));
        }
        info!(file = %path.display(), rows = rows.len(), "read archive window");
        Ok(rows)
    }
}

/// Zone codes such as `AT` or `IT_NORD` end up in file names.
fn zone_file_stem(zone: &str) -> Result<String> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid(format!("bad bidding zone code {zone:?}")));
    }
    Ok(zone.to_ascii_lowercase())
}

impl MarketData for Archive {
    fn query_load(
        &self,
        zone: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<LoadSeries> {
        let points = self.window(&format!("{}_load.csv", zone_file_stem(zone)?), start, end)?;
        let mut steps = points.windows(2).map(|pair| pair[1].0 - pair[0].0);
        if let Some(first) = steps.next() {
            if let Some(other) = steps.find(|step| *step != first) {
                warn!(zone, %first, %other, "load export has an irregular interval");
            }
        }
        Ok(LoadSeries { points })
    }

    fn query_day_ahead_prices(
        &self,
        zone: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        resolution: Resolution,
    ) -> Result<PriceSeries> {
        let file = format!("{}_day_ahead_{resolution}.csv", zone_file_stem(zone)?);
        let points = self
            .window(&file, start, end)?
            .into_iter()
            .map(|(timestamp, price)| PricePoint { timestamp, price })
            .collect();
        let series = PriceSeries::new(points)?;
        if let Some(step) = series.interval() {
            if step != resolution.step() {
                return Err(Error::invalid(format!(
                    "{file} is sampled every {step}, asked for {resolution}"
                )));
            }
        }
        Ok(series)
    }
}
