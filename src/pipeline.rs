//! Scale, window, train, predict and evaluate one price series

// External crates
use chrono::NaiveDate;
use log::info;

// Internal modules
use crate::config::PipelineConfig;
use crate::data::{PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::predictor::Predictor;
use crate::util::evaluation::{align_predictions, forecast_next_close, AlignedPrediction, Evaluation};
use crate::util::scaler::MinMaxScaler;
use crate::util::windowing::{split_windows, WindowedSplit};

/// Scaled series and its windows, before any model is involved
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub scaler: MinMaxScaler,
    pub scaled: Vec<f64>,
    pub split: WindowedSplit,
}

/// Forecast for the trading day after the last fetched row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextCloseForecast {
    /// Last date of the input series
    pub after: NaiveDate,
    pub predicted: f64,
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub symbol: String,
    pub training_length: usize,
    pub scaler: MinMaxScaler,
    pub train: Vec<PricePoint>,
    pub valid: Vec<AlignedPrediction>,
    pub evaluation: Evaluation,
    pub next_close: NextCloseForecast,
}

/// Fit the scaler on the full series and cut it into windows
pub fn prepare_data(series: &PriceSeries, config: &PipelineConfig) -> Result<PreparedData> {
    let closes = series.closes();
    if closes.len() <= config.window_size {
        return Err(ForecastError::InsufficientData {
            required: config.window_size,
            available: closes.len(),
        });
    }

    let scaler = MinMaxScaler::fit(&closes)?;
    let scaled = scaler.transform_all(&closes);
    info!(
        "Scaled {} closes of {} with min {:.2} / max {:.2}",
        scaled.len(),
        series.symbol(),
        scaler.min(),
        scaler.max()
    );

    let split = split_windows(&scaled, config.window_size, config.split_ratio)?;
    info!(
        "Training rows: {} ({} windows), validation rows: {}",
        split.training_length,
        split.train.len(),
        split.test.len()
    );

    Ok(PreparedData {
        scaler,
        scaled,
        split,
    })
}

/// Run the whole pipeline with the given predictor
///
/// # Arguments
///
/// * `series` - Fetched closes
/// * `config` - Windowing, split, training and metric settings; its dates
///   are not checked against the series
/// * `predictor` - Model to train and query
///
/// # Returns
///
/// Aligned validation predictions, error figures and the next-close forecast
pub fn run_pipeline<P: Predictor + ?Sized>(
    series: &PriceSeries,
    config: &PipelineConfig,
    predictor: &mut P,
) -> Result<ForecastReport> {
    config.validate_model()?;
    let prepared = prepare_data(series, config)?;
    let split = &prepared.split;

    predictor.train(
        &split.train.windows,
        &split.train.targets,
        config.batch_size,
        config.epochs,
    )?;

    let scaled_predictions = predictor.predict(&split.test.windows)?;
    let predictions = prepared.scaler.inverse_all(&scaled_predictions);

    let (train_rows, valid_rows) = series.split_at(split.training_length);
    let valid = align_predictions(valid_rows, &predictions)?;

    let actual: Vec<f64> = valid_rows.iter().map(|p| p.close).collect();
    let evaluation = Evaluation::new(&predictions, &actual, config.rmse_formula)?;
    info!(
        "Validation RMSE {:.4}, squared mean error {:.4}, MAE {:.4}",
        evaluation.rmse, evaluation.squared_mean_error, evaluation.mae
    );

    let predicted = forecast_next_close(
        predictor,
        &prepared.scaler,
        &prepared.scaled,
        config.window_size,
    )?;
    let after = series
        .last()
        .map(|p| p.date)
        .ok_or(ForecastError::InsufficientData {
            required: config.window_size,
            available: 0,
        })?;

    Ok(ForecastReport {
        symbol: series.symbol().to_string(),
        training_length: split.training_length,
        scaler: prepared.scaler,
        train: train_rows.to_vec(),
        valid,
        evaluation,
        next_close: NextCloseForecast { after, predicted },
    })
}
