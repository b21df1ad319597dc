//! Yahoo Finance chart API adapter
//!
//! Fetches daily bars with a blocking HTTP client and keeps only the close.

// External crates
use chrono::{DateTime, NaiveDate};
use log::{debug, info};
use serde::Deserialize;

// Internal modules
use super::price_series::{PricePoint, PriceSeries};
use super::PriceSource;
use crate::constants::YAHOO_CHART_URL;
use crate::error::{ForecastError, Result};

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Daily closes from the Yahoo Finance chart endpoint
#[derive(Debug, Clone)]
pub struct YahooPriceSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooPriceSource {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    /// Point the adapter at a different chart endpoint
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        // period2 is exclusive, so ask for the midnight after `end`
        let period2 = end
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp());

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            period1.unwrap_or_default(),
            period2.unwrap_or_default()
        )
    }
}

impl PriceSource for YahooPriceSource {
    fn fetch_closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        if end < start {
            return Err(ForecastError::data_fetch(
                symbol,
                format!("end date {} precedes start date {}", end, start),
            ));
        }

        let url = self.chart_url(symbol, start, end);
        info!("Fetching {} closes {}..{} from Yahoo Finance", symbol, start, end);
        debug!("GET {}", url);

        let response: ChartResponse = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ForecastError::data_fetch(symbol, e))?
            .json()
            .map_err(|e| ForecastError::data_fetch(symbol, e))?;

        parse_chart_response(symbol, response, start, end)
    }
}

/// Convert a decoded chart response into a validated series
///
/// Null closes are gaps in the source data and are skipped.
pub fn parse_chart_response(
    symbol: &str,
    response: ChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries> {
    if let Some(error) = response.chart.error {
        return Err(ForecastError::data_fetch(
            symbol,
            format!("Yahoo Finance error: {} - {}", error.code, error.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ForecastError::data_fetch(symbol, "No data returned"))?;

    let timestamps = data
        .timestamp
        .ok_or_else(|| ForecastError::data_fetch(symbol, "No timestamps"))?;
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::data_fetch(symbol, "No quote data"))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(quote.close.iter()) {
        let Some(close) = close else { continue };
        let date = DateTime::from_timestamp(*ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ForecastError::data_fetch(symbol, format!("bad timestamp {}", ts)))?;
        if date >= start && date <= end {
            points.push(PricePoint::new(date, *close));
        }
    }

    PriceSeries::new(symbol, points)
}
