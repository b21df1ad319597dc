// External crates
use chrono::NaiveDate;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Internal modules
use super::scaler::MinMaxScaler;
use super::windowing::latest_window;
use crate::data::PricePoint;
use crate::error::{ForecastError, Result};
use crate::predictor::Predictor;

/// Which error figure is reported as the headline "RMSE"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RmseFormula {
    /// sqrt(mean((p - a)^2))
    #[default]
    Standard,
    /// (mean(p - a))^2, signed errors averaged before squaring
    SquaredMeanError,
}

impl fmt::Display for RmseFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RmseFormula::Standard => write!(f, "standard"),
            RmseFormula::SquaredMeanError => write!(f, "squared-mean-error"),
        }
    }
}

impl FromStr for RmseFormula {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "rmse" => Ok(RmseFormula::Standard),
            "squared-mean-error" | "squared_mean_error" | "reference" => {
                Ok(RmseFormula::SquaredMeanError)
            }
            other => Err(format!(
                "unknown RMSE formula '{}' (expected 'standard' or 'squared-mean-error')",
                other
            )),
        }
    }
}

impl RmseFormula {
    pub fn compute(self, predicted: &[f64], actual: &[f64]) -> Result<f64> {
        match self {
            RmseFormula::Standard => rmse(predicted, actual),
            RmseFormula::SquaredMeanError => squared_mean_error(predicted, actual),
        }
    }
}

fn residuals(predicted: &[f64], actual: &[f64]) -> Result<Array1<f64>> {
    if predicted.len() != actual.len() {
        return Err(ForecastError::Computation(format!(
            "prediction count {} does not match actual count {}",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(ForecastError::Computation(
            "cannot score an empty prediction set".to_string(),
        ));
    }

    let predicted = Array1::from(predicted.to_vec());
    let actual = Array1::from(actual.to_vec());
    Ok(predicted - actual)
}

/// Root mean squared error: each residual squared before averaging
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    let diff = residuals(predicted, actual)?;
    let mse = diff.mapv(|x| x * x).mean().unwrap_or(0.0);
    Ok(mse.sqrt())
}

/// Square of the mean signed residual
///
/// Positive and negative errors cancel out before squaring, so this is not
/// a root-mean-square error.
pub fn squared_mean_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    let diff = residuals(predicted, actual)?;
    let mean = diff.mean().unwrap_or(0.0);
    Ok(mean * mean)
}

/// Mean absolute error
pub fn mae(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    let diff = residuals(predicted, actual)?;
    Ok(diff.mapv(f64::abs).mean().unwrap_or(0.0))
}

/// Error figures for the test partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub formula: RmseFormula,
    pub rmse: f64,
    pub squared_mean_error: f64,
    pub mae: f64,
}

impl Evaluation {
    pub fn new(predicted: &[f64], actual: &[f64], formula: RmseFormula) -> Result<Self> {
        Ok(Self {
            formula,
            rmse: rmse(predicted, actual)?,
            squared_mean_error: squared_mean_error(predicted, actual)?,
            mae: mae(predicted, actual)?,
        })
    }

    /// The figure selected by `formula`
    pub fn headline(&self) -> f64 {
        match self.formula {
            RmseFormula::Standard => self.rmse,
            RmseFormula::SquaredMeanError => self.squared_mean_error,
        }
    }
}

/// A validation day with its actual and predicted close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPrediction {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Pair every validation row with its prediction
pub fn align_predictions(actual: &[PricePoint], predicted: &[f64]) -> Result<Vec<AlignedPrediction>> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::Computation(format!(
            "{} validation rows but {} predictions",
            actual.len(),
            predicted.len()
        )));
    }

    Ok(actual
        .iter()
        .zip(predicted.iter())
        .map(|(point, &predicted)| AlignedPrediction {
            date: point.date,
            actual: point.close,
            predicted,
        })
        .collect())
}

/// Look up the comparison pair at `index` in the validation rows
pub fn sample_comparison(aligned: &[AlignedPrediction], index: usize) -> Result<AlignedPrediction> {
    aligned.get(index).copied().ok_or_else(|| {
        ForecastError::InvalidConfig(format!(
            "sample index {} is outside the {} validation rows",
            index,
            aligned.len()
        ))
    })
}

/// Predict the close after the last row from the final window of the whole series
pub fn forecast_next_close<P: Predictor + ?Sized>(
    predictor: &P,
    scaler: &MinMaxScaler,
    scaled: &[f64],
    window_size: usize,
) -> Result<f64> {
    let window = latest_window(scaled, window_size)?;
    let predicted = predictor.predict(&[window])?;
    let scaled_close = predicted.first().copied().ok_or_else(|| {
        ForecastError::Computation("predictor returned no value for the final window".to_string())
    })?;
    Ok(scaler.inverse(scaled_close))
}
