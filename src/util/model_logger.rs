use std::fs;
use std::path::{Path, PathBuf};
use chrono::{Local, NaiveDate};
use serde::{Serialize, Deserialize};
use std::io::Write;
use anyhow::Result;

use crate::config::PipelineConfig;
use crate::pipeline::ForecastReport;

#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastRun {
    pub timestamp: String,
    pub ticker: String,
    pub model_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window_size: usize,
    pub split_ratio: f64,
    pub lstm_units: usize,
    pub dense_units: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: Option<u64>,
    pub training_length: Option<usize>,
    pub test_rmse: Option<f64>,
    pub test_squared_mean_error: Option<f64>,
    pub test_mae: Option<f64>,
    pub predicted_close: Option<f64>,
    pub actual_close: Option<f64>,
    pub training_time_seconds: Option<f64>,
    pub notes: String,
}

impl ForecastRun {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ticker: config.symbol.clone(),
            model_type: "lstm".to_string(),
            start_date: config.start_date,
            end_date: config.end_date,
            window_size: config.window_size,
            split_ratio: config.split_ratio,
            lstm_units: config.lstm_units,
            dense_units: config.dense_units,
            batch_size: config.batch_size,
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            seed: config.seed,
            training_length: None,
            test_rmse: None,
            test_squared_mean_error: None,
            test_mae: None,
            predicted_close: None,
            actual_close: None,
            training_time_seconds: None,
            notes: "".to_string(),
        }
    }

    pub fn record_report(&mut self, report: &ForecastReport) {
        self.training_length = Some(report.training_length);
        self.test_rmse = Some(report.evaluation.rmse);
        self.test_squared_mean_error = Some(report.evaluation.squared_mean_error);
        self.test_mae = Some(report.evaluation.mae);
        self.predicted_close = Some(report.next_close.predicted);
    }

    pub fn set_actual_close(&mut self, close: f64) {
        self.actual_close = Some(close);
    }

    pub fn set_training_time(&mut self, seconds: f64) {
        self.training_time_seconds = Some(seconds);
    }

    pub fn add_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_w{}_e{}_run.json",
            self.ticker, self.model_type, self.window_size, self.epochs,
        )
    }

    pub fn save(&self, experiment_dir: &Path) -> Result<PathBuf> {
        // Create directory if it doesn't exist
        fs::create_dir_all(experiment_dir)?;

        let file_path = experiment_dir.join(self.file_name());

        // Serialize to JSON and save
        let json = serde_json::to_string_pretty(&self)?;
        let mut file = fs::File::create(&file_path)?;
        file.write_all(json.as_bytes())?;

        Ok(file_path)
    }
}

/// Timestamped sub-directory of `root` for one run
pub fn create_run_dir(root: &Path) -> Result<PathBuf> {
    let dir = root.join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_run_record() -> Result<()> {
        let dir = tempdir()?;
        let run_dir = create_run_dir(dir.path())?;

        let mut run = ForecastRun::new(&PipelineConfig::default());
        run.set_actual_close(50.59);
        run.set_training_time(1.5);
        run.add_note("first");
        run.add_note("second");

        let path = run.save(&run_dir)?;
        assert!(path.ends_with("INTC_lstm_w50_e1_run.json"));

        let saved: ForecastRun = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(saved.actual_close, Some(50.59));
        assert_eq!(saved.notes, "first\nsecond");
        assert_eq!(saved.test_rmse, None);

        Ok(())
    }
}
