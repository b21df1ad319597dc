use thiserror::Error;

/// Errors raised by the forecasting pipeline.
///
/// Every variant is fatal for a run; nothing is retried.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The data source could not deliver a usable price series
    #[error("failed to fetch prices for {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },

    /// Fewer observations than the windowing needs
    #[error("insufficient data: need more than {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Min-max scaling of a flat series would divide by zero
    #[error("cannot scale a flat price series (every close equals {value})")]
    DegenerateScale { value: f64 },

    /// Numerical failure while training, predicting or evaluating
    #[error("computation failed: {0}")]
    Computation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write report: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    pub fn data_fetch(symbol: &str, reason: impl ToString) -> Self {
        Self::DataFetch {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
