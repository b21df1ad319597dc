// External crates
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Internal modules
use crate::error::{ForecastError, Result};

/// One trading day's closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for a single symbol, strictly ordered by date
///
/// The series is validated once on construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from already-ordered points
    ///
    /// # Arguments
    ///
    /// * `symbol` - Ticker the prices belong to
    /// * `points` - (date, close) pairs, dates strictly increasing
    ///
    /// # Returns
    ///
    /// A `DataFetch` error when the points are empty, out of order,
    /// duplicated or contain a non-finite close
    pub fn new(symbol: &str, points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::data_fetch(symbol, "no price rows returned"));
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::data_fetch(
                    symbol,
                    format!(
                        "dates must be strictly increasing ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                ));
            }
        }

        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::data_fetch(
                symbol,
                format!("non-finite close {} on {}", bad.close, bad.date),
            ));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Split into (training rows, validation rows) at `index`
    pub fn split_at(&self, index: usize) -> (&[PricePoint], &[PricePoint]) {
        self.points.split_at(index.min(self.points.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_accepts_increasing_dates() {
        let series = PriceSeries::new(
            "INTC",
            vec![PricePoint::new(day(2), 10.0), PricePoint::new(day(3), 11.5)],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "INTC");
        assert_eq!(series.closes(), vec![10.0, 11.5]);
        assert_eq!(series.last().unwrap().date, day(3));
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let result = PriceSeries::new(
            "INTC",
            vec![PricePoint::new(day(2), 10.0), PricePoint::new(day(2), 11.0)],
        );
        assert!(matches!(result, Err(ForecastError::DataFetch { .. })));
    }

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(PriceSeries::new("INTC", Vec::new()).is_err());

        let result = PriceSeries::new("INTC", vec![PricePoint::new(day(2), f64::NAN)]);
        assert!(matches!(result, Err(ForecastError::DataFetch { .. })));
    }

    #[test]
    fn test_split_at_clamps() {
        let series = PriceSeries::new(
            "INTC",
            (1..=5).map(|d| PricePoint::new(day(d), d as f64)).collect(),
        )
        .unwrap();

        let (train, valid) = series.split_at(3);
        assert_eq!(train.len(), 3);
        assert_eq!(valid.len(), 2);

        let (train, valid) = series.split_at(10);
        assert_eq!(train.len(), 5);
        assert!(valid.is_empty());
    }
}
