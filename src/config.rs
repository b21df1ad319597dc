// External crates
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Internal modules
use crate::constants::{
    BATCH_SIZE, DEFAULT_COMPARE_DATE, DEFAULT_END_DATE, DEFAULT_SAMPLE_INDEX, DEFAULT_START_DATE,
    DEFAULT_SYMBOL, DENSE_UNITS, EPOCHS, LEARNING_RATE, LSTM_UNITS, TRAIN_SPLIT_RATIO, WINDOW_SIZE,
};
use crate::error::{ForecastError, Result};
use crate::lstm::{StackedLstmConfig, TrainingConfig};
use crate::util::evaluation::RmseFormula;

fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Everything a forecasting run needs to know
///
/// Missing fields in a JSON config fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window_size: usize,
    pub split_ratio: f64,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub lstm_units: usize,
    pub dense_units: usize,
    pub seed: Option<u64>,
    pub rmse_formula: RmseFormula,
    /// Day whose actual close is compared against the next-close forecast
    pub compare_date: Option<NaiveDate>,
    /// Validation row printed as a (prediction, actual) pair
    pub sample_index: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            start_date: ymd(DEFAULT_START_DATE),
            end_date: ymd(DEFAULT_END_DATE),
            window_size: WINDOW_SIZE,
            split_ratio: TRAIN_SPLIT_RATIO,
            batch_size: BATCH_SIZE,
            epochs: EPOCHS,
            learning_rate: LEARNING_RATE,
            lstm_units: LSTM_UNITS,
            dense_units: DENSE_UNITS,
            seed: None,
            rmse_formula: RmseFormula::default(),
            compare_date: Some(ymd(DEFAULT_COMPARE_DATE)),
            sample_index: Some(DEFAULT_SAMPLE_INDEX),
        }
    }
}

impl PipelineConfig {
    /// Check every option, dates included, before any data is fetched
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(ForecastError::InvalidConfig(
                "symbol must not be empty".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(ForecastError::InvalidConfig(format!(
                "end date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        if let Some(compare) = self.compare_date {
            if compare <= self.end_date {
                return Err(ForecastError::InvalidConfig(format!(
                    "compare date {} must come after the end date {}",
                    compare, self.end_date
                )));
            }
        }

        self.validate_model()
    }

    /// Check the windowing, split and training options only
    ///
    /// The dates describe what to fetch, so a series that is already in hand
    /// is not checked against them.
    pub fn validate_model(&self) -> Result<()> {
        let invalid = |msg: String| Err(ForecastError::InvalidConfig(msg));

        if self.window_size == 0 {
            return invalid("window size must be at least 1".to_string());
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return invalid(format!("split ratio must be in (0, 1), got {}", self.split_ratio));
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1".to_string());
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!("learning rate must be positive, got {}", self.learning_rate));
        }
        if self.lstm_units == 0 || self.dense_units == 0 {
            return invalid("layer sizes must be at least 1".to_string());
        }

        Ok(())
    }

    /// Move the end date and compare against the day after it
    pub fn set_end_date(&mut self, end_date: NaiveDate) {
        self.end_date = end_date;
        self.compare_date = end_date.succ_opt();
    }

    pub fn model_config(&self) -> StackedLstmConfig {
        StackedLstmConfig::new(self.lstm_units, self.dense_units)
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            learning_rate: self.learning_rate,
            batch_size: self.batch_size,
            epochs: self.epochs,
            shuffle: true,
            seed: self.seed,
        }
    }

    /// Load a configuration from a JSON file
    ///
    /// A file that sets `end_date` without `compare_date` compares against
    /// the day after its end date.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_json = fs::read_to_string(path.as_ref())?;
        let parse_error = |e: serde_json::Error| {
            ForecastError::InvalidConfig(format!("{}: {}", path.as_ref().display(), e))
        };

        let value: serde_json::Value = serde_json::from_str(&config_json).map_err(parse_error)?;
        let moves_end = value.get("end_date").is_some() && value.get("compare_date").is_none();

        let mut config: Self = serde_json::from_value(value).map_err(parse_error)?;
        if moves_end {
            config.set_end_date(config.end_date);
        }
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_json = serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::InvalidConfig(e.to_string()))?;
        fs::write(path, config_json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_reproduce_reference_run() {
        let config = PipelineConfig::default();

        assert_eq!(config.symbol, "INTC");
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2013, 7, 3).unwrap());
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2020, 7, 23).unwrap());
        assert_eq!(config.window_size, 50);
        assert_eq!(config.split_ratio, 0.7);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.epochs, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_ratio = PipelineConfig {
            split_ratio: 0.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(bad_ratio.validate(), Err(ForecastError::InvalidConfig(_))));

        let bad_window = PipelineConfig {
            window_size: 0,
            ..PipelineConfig::default()
        };
        assert!(bad_window.validate().is_err());

        let reversed = PipelineConfig {
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            compare_date: None,
            ..PipelineConfig::default()
        };
        assert!(reversed.validate().is_err());

        let early_compare = PipelineConfig {
            compare_date: Some(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()),
            ..PipelineConfig::default()
        };
        assert!(early_compare.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"symbol": "MSFT", "epochs": 3, "rmse_formula": "squared-mean-error"}"#,
        )
        .unwrap();

        let config = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(config.symbol, "MSFT");
        assert_eq!(config.epochs, 3);
        assert_eq!(config.rmse_formula, RmseFormula::SquaredMeanError);
        assert_eq!(config.window_size, 50);
    }

    #[test]
    fn test_json_end_date_moves_compare_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"end_date": "2023-12-29"}"#).unwrap();

        let config = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());
        assert_eq!(config.compare_date, NaiveDate::from_ymd_opt(2023, 12, 30));
        assert!(config.validate().is_ok());

        fs::write(
            &path,
            r#"{"end_date": "2023-12-29", "compare_date": "2024-01-02"}"#,
        )
        .unwrap();
        let config = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(config.compare_date, NaiveDate::from_ymd_opt(2024, 1, 2));

        fs::write(&path, r#"{"end_date": "2023-12-29", "compare_date": null}"#).unwrap();
        let config = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(config.compare_date, None);
    }

    #[test]
    fn test_model_checks_ignore_dates() {
        let config = PipelineConfig {
            end_date: NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.validate_model().is_ok());

        let full_split = PipelineConfig {
            split_ratio: 1.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            full_split.validate_model(),
            Err(ForecastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = PipelineConfig {
            seed: Some(11),
            sample_index: None,
            ..PipelineConfig::default()
        };

        config.save_json(&path).unwrap();
        assert_eq!(PipelineConfig::load_json(&path).unwrap(), config);
    }
}
