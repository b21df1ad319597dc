// External crates
use chrono::{DateTime, NaiveDate};
use log::{debug, info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};

// Internal modules
use super::price_series::{PricePoint, PriceSeries};
use super::PriceSource;
use crate::error::{ForecastError, Result};

const DATE_ALIASES: [&str; 7] = ["date", "time", "timestamp", "datetime", "dt", "day", "t"];
const CLOSE_ALIASES: [&str; 5] = ["close", "c", "cl", "closeprice", "close_price"];

/// Reads daily closes from a CSV file with a date and a close column
///
/// Column names are matched case-insensitively, so both `Date,Close` exports
/// and lowercase bar files work.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_frame(&self, symbol: &str) -> Result<DataFrame> {
        info!("Loading data from: {}", self.path.display());

        if !self.path.exists() {
            return Err(ForecastError::data_fetch(
                symbol,
                format!("File not found: {}", self.path.display()),
            ));
        }

        let file = std::fs::File::open(&self.path)?;
        CsvReader::new(file)
            .finish()
            .map_err(|e| ForecastError::data_fetch(symbol, e))
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch_closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let df = self.read_frame(symbol)?;
        let mut points = closes_from_frame(&df, symbol)?;

        // Sort by date, then keep the requested window
        points.sort_by_key(|p| p.date);
        points.retain(|p| p.date >= start && p.date <= end);
        debug!(
            "{} rows between {} and {} in {}",
            points.len(),
            start,
            end,
            self.path.display()
        );

        PriceSeries::new(symbol, points)
    }
}

fn find_column<'a>(df: &'a DataFrame, aliases: &[&str]) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|c| aliases.contains(&c.name().as_str().to_lowercase().as_str()))
}

// Epochs this large are milliseconds (seconds would be past the year 5000)
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Unix timestamps, as in `timestamp` / `t` columns
    if let Ok(epoch) = raw.parse::<i64>() {
        let seconds = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            epoch.div_euclid(1000)
        } else {
            epoch
        };
        return DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive());
    }
    // Accept "YYYY-MM-DD" with or without a trailing time part
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Extracts unsorted (date, close) points from a loaded frame
///
/// Rows with a missing close are dropped; rows with an unparseable date are an error.
pub fn closes_from_frame(df: &DataFrame, symbol: &str) -> Result<Vec<PricePoint>> {
    let date_col = find_column(df, &DATE_ALIASES).ok_or_else(|| {
        ForecastError::data_fetch(symbol, "Required column date not found")
    })?;
    let close_col = find_column(df, &CLOSE_ALIASES).ok_or_else(|| {
        ForecastError::data_fetch(symbol, "Required column close not found")
    })?;

    let date_strings = date_col
        .cast(&DataType::String)
        .map_err(|e| ForecastError::data_fetch(symbol, e))?;
    let close_values = close_col
        .cast(&DataType::Float64)
        .map_err(|e| ForecastError::data_fetch(symbol, e))?;

    let dates = date_strings
        .as_materialized_series()
        .str()
        .map_err(|e| ForecastError::data_fetch(symbol, e))?;
    let closes = close_values
        .as_materialized_series()
        .f64()
        .map_err(|e| ForecastError::data_fetch(symbol, e))?;

    let mut points = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for (raw_date, close) in dates.into_iter().zip(closes.into_iter()) {
        let (Some(raw_date), Some(close)) = (raw_date, close) else {
            skipped += 1;
            continue;
        };
        let date = parse_date(raw_date).ok_or_else(|| {
            ForecastError::data_fetch(symbol, format!("unparseable date '{}'", raw_date))
        })?;
        points.push(PricePoint::new(date, close));
    }

    if skipped > 0 {
        warn!("Dropped {} rows with missing date or close", skipped);
    }

    Ok(points)
}
