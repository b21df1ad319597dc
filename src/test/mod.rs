
use chrono::{Duration, NaiveDate};
use std::sync::{Mutex, MutexGuard};

use crate::data::{PricePoint, PriceSeries};
use crate::error::Result;
use crate::predictor::Predictor;

static BACKEND_RNG: Mutex<()> = Mutex::new(());

/// Serialises tests that draw from the NdArray backend's global RNG
///
/// Seeding is only reproducible if no other test initialises weights in between.
pub fn backend_rng_guard() -> MutexGuard<'static, ()> {
    BACKEND_RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Daily series starting 2020-01-01 with one row per value
pub fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + Duration::days(i as i64), close))
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

/// Predicts the last value of each window and remembers what it was trained on
#[derive(Debug, Default)]
pub struct PersistencePredictor {
    pub trained_windows: usize,
    pub batch_size: usize,
    pub epochs: usize,
}

impl Predictor for PersistencePredictor {
    fn train(
        &mut self,
        windows: &[Vec<f64>],
        targets: &[f64],
        batch_size: usize,
        epochs: usize,
    ) -> Result<()> {
        assert_eq!(windows.len(), targets.len());
        self.trained_windows = windows.len();
        self.batch_size = batch_size;
        self.epochs = epochs;
        Ok(())
    }

    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(windows
            .iter()
            .map(|w| w.last().copied().unwrap_or(0.0))
            .collect())
    }
}
