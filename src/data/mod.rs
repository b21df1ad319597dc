//! Price data: the series type and the adapters that fetch it

pub mod csv_source;
pub mod price_series;
pub mod yahoo_source;

use chrono::NaiveDate;

use crate::error::Result;

pub use csv_source::CsvPriceSource;
pub use price_series::{PricePoint, PriceSeries};
pub use yahoo_source::YahooPriceSource;

/// Supplies daily closing prices for a symbol over an inclusive date range
pub trait PriceSource {
    fn fetch_closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}
