// External crates
use serde::{Deserialize, Serialize};

// Internal modules
use crate::error::{ForecastError, Result};

/// Min-max scaler mapping `[min, max]` of the fitted data onto `[0, 1]`
///
/// The pipeline fits it once on the whole close series, test rows included,
/// so test windows are scaled with bounds that have seen the test period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit the scaler on a series
    ///
    /// # Arguments
    ///
    /// * `values` - Raw values to take the bounds from
    ///
    /// # Returns
    ///
    /// `InsufficientData` for an empty series, `DegenerateScale` when every
    /// value is equal
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if max == min {
            return Err(ForecastError::DegenerateScale { value: min });
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }

    pub fn inverse_all(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&s| self.inverse(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform_inverse() {
        let scaler = MinMaxScaler::fit(&[10.0, 20.0, 30.0]).unwrap();

        assert_eq!(scaler.min(), 10.0);
        assert_eq!(scaler.max(), 30.0);
        assert_eq!(scaler.transform(20.0), 0.5);
        assert_eq!(scaler.inverse(0.5), 20.0);
        assert_eq!(scaler.transform_all(&[10.0, 30.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let closes = [23.51, 24.02, 22.87, 58.31, 60.4, 47.99, 50.59];
        let scaler = MinMaxScaler::fit(&closes).unwrap();

        let scaled = scaler.transform_all(&closes);
        assert!(scaled.iter().all(|s| (0.0..=1.0).contains(s)));

        for (restored, original) in scaler.inverse_all(&scaled).iter().zip(closes.iter()) {
            assert!((restored - original).abs() < 1e-9);
        }
    }

    #[test]
    fn test_flat_series_is_degenerate() {
        let result = MinMaxScaler::fit(&[42.0, 42.0, 42.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DegenerateScale { value }) if value == 42.0
        ));
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        assert!(matches!(
            MinMaxScaler::fit(&[]),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
