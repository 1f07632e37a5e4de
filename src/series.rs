//! ### Series
//! Time-indexed values loaded once per run and never mutated.

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<FixedOffset>,
    pub price: f64,
}

/// Chronological, evenly sampled, non-empty day-ahead prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::invalid("price series is empty"));
        }
        if let Some((idx, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.price.is_finite())
        {
            return Err(Error::invalid(format!(
                "price at row {idx} ({}) is not a finite number",
                point.timestamp
            )));
        }

        let mut step: Option<TimeDelta> = None;
        for pair in points.windows(2) {
            let delta = pair[1].timestamp - pair[0].timestamp;
            if delta <= TimeDelta::zero() {
                return Err(Error::invalid(format!(
                    "timestamps out of order: {} follows {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
            match step {
                None => step = Some(delta),
                Some(expected) if expected != delta => {
                    return Err(Error::invalid(format!(
                        "sampling interval changes from {expected} to {delta} at {}",
                        pair[1].timestamp
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Plain ordered prices, the shape the dispatch engine consumes.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<FixedOffset>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// `None` for a single-point series.
    pub fn interval(&self) -> Option<TimeDelta> {
        match self.points.as_slice() {
            [first, second, ..] => Some(second.timestamp - first.timestamp),
            _ => None,
        }
    }
}

/// Load exports skip hours around DST changes, so no fixed interval here.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSeries {
    pub points: Vec<(DateTime<FixedOffset>, f64)>,
}

#[cfg(test)]
pub(crate) fn quarter_hours(prices: &[f64]) -> PriceSeries {
    let start = DateTime::parse_from_rfc3339("2023-11-01T00:00:00+01:00").unwrap();
    PriceSeries::new(
        prices
            .iter()
            .enumerate()
            .map(|(idx, &price)| PricePoint {
                timestamp: start + TimeDelta::minutes(15 * idx as i64),
                price,
            })
            .collect(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn interval_of_quarter_hours() {
        let series = quarter_hours(&[50., 52., 48.]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.interval(), Some(TimeDelta::minutes(15)));
        assert_eq!(series.values(), vec![50., 52., 48.]);
    }

    #[test]
    fn single_point_has_no_interval() {
        assert_eq!(quarter_hours(&[50.]).interval(), None);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            PriceSeries::new(vec![]),
            Err(Error::InputValidation(_))
        ));
    }

    #[test]
    fn rejects_unordered() {
        let points = vec![
            PricePoint {
                timestamp: at("2023-11-01T00:15:00+01:00"),
                price: 1.,
            },
            PricePoint {
                timestamp: at("2023-11-01T00:00:00+01:00"),
                price: 2.,
            },
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn rejects_irregular_interval() {
        let points = ["00:00", "00:15", "01:00"]
            .iter()
            .map(|hm| PricePoint {
                timestamp: at(&format!("2023-11-01T{hm}:00+01:00")),
                price: 1.,
            })
            .collect();
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn offset_change_is_not_an_interval_change() {
        // 2023-10-29 02:45+02:00 is followed by 02:00+01:00 in Brussels.
        let points = ["2023-10-29T02:45:00+02:00", "2023-10-29T02:00:00+01:00"]
            .iter()
            .map(|s| PricePoint {
                timestamp: at(s),
                price: 1.,
            })
            .collect();
        let series = PriceSeries::new(points).unwrap();
        assert_eq!(series.interval(), Some(TimeDelta::minutes(15)));
    }

    #[test]
    fn rejects_nan_price() {
        let points = vec![PricePoint {
            timestamp: at("2023-11-01T00:00:00+01:00"),
            price: f64::NAN,
        }];
        assert!(PriceSeries::new(points).is_err());
    }
}
