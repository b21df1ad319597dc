// External crates
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

// Internal modules
use crate::constants::{HISTORY_FILE_NAME, PREDICTIONS_FILE_NAME};
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::pipeline::ForecastReport;

fn report_error(e: PolarsError) -> ForecastError {
    ForecastError::Report(e.to_string())
}

/// Closing price history as a (date, close) frame
pub fn history_frame(series: &PriceSeries) -> Result<DataFrame> {
    let dates: Vec<String> = series.points().iter().map(|p| p.date.to_string()).collect();
    let closes = series.closes();

    DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("close".into(), closes).into(),
    ])
    .map_err(report_error)
}

/// Train, validation and prediction series on one date axis
///
/// Training rows have no prediction.
pub fn prediction_frame(report: &ForecastReport) -> Result<DataFrame> {
    let rows = report.train.len() + report.valid.len();
    let mut dates = Vec::with_capacity(rows);
    let mut closes = Vec::with_capacity(rows);
    let mut partitions = Vec::with_capacity(rows);
    let mut predictions: Vec<Option<f64>> = Vec::with_capacity(rows);

    for point in &report.train {
        dates.push(point.date.to_string());
        closes.push(point.close);
        partitions.push("train");
        predictions.push(None);
    }
    for row in &report.valid {
        dates.push(row.date.to_string());
        closes.push(row.actual);
        partitions.push("valid");
        predictions.push(Some(row.predicted));
    }

    DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("close".into(), closes).into(),
        Series::new("partition".into(), partitions).into(),
        Series::new("prediction".into(), predictions).into(),
    ])
    .map_err(report_error)
}

/// Write a frame as CSV with a header row
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(report_error)
}

/// Export the chart data for both plots into `output_dir`
///
/// # Returns
///
/// Paths of the history file and the prediction overlay file
pub fn export_chart_data(
    series: &PriceSeries,
    report: &ForecastReport,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let history_path = output_dir.join(HISTORY_FILE_NAME);
    let predictions_path = output_dir.join(PREDICTIONS_FILE_NAME);

    write_csv(&mut history_frame(series)?, &history_path)?;
    write_csv(&mut prediction_frame(report)?, &predictions_path)?;

    Ok((history_path, predictions_path))
}
