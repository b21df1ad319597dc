// External crates
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::warn;
use std::path::PathBuf;

// Local crate
use close_forecast::build_info;
use close_forecast::config::PipelineConfig;
use close_forecast::data::{CsvPriceSource, PriceSource, YahooPriceSource};
use close_forecast::lstm::{LstmPredictor, TrainingBackend};
use close_forecast::pipeline::run_pipeline;
use close_forecast::util::evaluation::{sample_comparison, RmseFormula};
use close_forecast::util::{model_logger, report};

/// Train an LSTM on daily closes and forecast the next close
#[derive(Parser, Debug)]
#[command(name = "close-forecast", version, about)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    symbol: Option<String>,

    /// First day to fetch (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last day to fetch, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Lookback length in trading days
    #[arg(long)]
    window_size: Option<usize>,

    /// Share of rows used for training
    #[arg(long)]
    split_ratio: Option<f64>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    lstm_units: Option<usize>,

    #[arg(long)]
    dense_units: Option<usize>,

    /// Seed weight initialisation and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Headline metric: standard or squared-mean-error
    #[arg(long)]
    rmse_formula: Option<RmseFormula>,

    /// Day whose actual close is compared with the forecast
    #[arg(long)]
    compare_date: Option<NaiveDate>,

    /// Skip the forecast-vs-actual comparison
    #[arg(long, conflicts_with = "compare_date")]
    no_compare: bool,

    /// Validation row to print as a (prediction, actual) pair
    #[arg(long)]
    sample_index: Option<usize>,

    /// Read prices from a CSV file instead of Yahoo Finance
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Directory for the chart data CSV files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Directory for JSON run records
    #[arg(long, default_value = "experiments")]
    record_dir: PathBuf,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_json(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.to_uppercase();
        }
        if let Some(v) = self.start_date {
            config.start_date = v;
        }
        if let Some(v) = self.end_date {
            config.set_end_date(v);
        }
        if let Some(v) = self.window_size {
            config.window_size = v;
        }
        if let Some(v) = self.split_ratio {
            config.split_ratio = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.epochs {
            config.epochs = v;
        }
        if let Some(v) = self.learning_rate {
            config.learning_rate = v;
        }
        if let Some(v) = self.lstm_units {
            config.lstm_units = v;
        }
        if let Some(v) = self.dense_units {
            config.dense_units = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(v) = self.rmse_formula {
            config.rmse_formula = v;
        }
        if self.compare_date.is_some() {
            config.compare_date = self.compare_date;
        }
        if self.no_compare {
            config.compare_date = None;
        }
        if self.sample_index.is_some() {
            config.sample_index = self.sample_index;
        }

        config.validate()?;
        Ok(config)
    }

    fn price_source(&self) -> Box<dyn PriceSource> {
        match &self.csv {
            Some(path) => Box::new(CsvPriceSource::new(path)),
            None => Box::new(YahooPriceSource::new()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let source = cli.price_source();

    println!(
        "close-forecast {} ({} build, {})",
        build_info::PKG_VERSION,
        build_info::PROFILE,
        build_info::RUSTC_VERSION
    );
    println!(
        "Using ticker: {} | {} to {}",
        config.symbol, config.start_date, config.end_date
    );

    // Get stock quote
    let series = source
        .fetch_closes(&config.symbol, config.start_date, config.end_date)
        .with_context(|| format!("Failed to fetch closes for {}", config.symbol))?;
    println!("Data shape: {} rows x 1 column (close)", series.len());
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!(
            "First close {} on {}, last close {} on {}",
            first.close, first.date, last.close, last.date
        );
    }

    // Train and evaluate
    let device = Default::default();
    let mut predictor =
        LstmPredictor::<TrainingBackend>::new(config.model_config(), config.training_config(), device);
    let forecast = run_pipeline(&series, &config, &mut predictor)
        .context("Forecasting pipeline failed")?;

    println!(
        "Training dataset size: {} rows | Validation dataset size: {} rows",
        forecast.train.len(),
        forecast.valid.len()
    );
    println!(
        "Test RMSE ({}): {:.4}",
        forecast.evaluation.formula,
        forecast.evaluation.headline()
    );
    println!(
        "  standard RMSE: {:.4} | squared mean error: {:.4} | MAE: {:.4}",
        forecast.evaluation.rmse, forecast.evaluation.squared_mean_error, forecast.evaluation.mae
    );

    if let Some(index) = config.sample_index {
        match sample_comparison(&forecast.valid, index) {
            Ok(row) => println!(
                "Validation row {} ({}): predicted {:.4}, actual {:.4}",
                index, row.date, row.predicted, row.actual
            ),
            Err(e) => warn!("Skipping sample comparison: {}", e),
        }
    }

    // Chart data
    let (history_path, predictions_path) =
        report::export_chart_data(&series, &forecast, &cli.output_dir)
            .context("Failed to export chart data")?;
    println!(
        "Chart data written to {} and {}",
        history_path.display(),
        predictions_path.display()
    );

    // Next close vs actual
    let mut run = model_logger::ForecastRun::new(&config);
    run.record_report(&forecast);
    run.set_training_time(predictor.training_seconds());

    let actual = match config.compare_date {
        Some(day) => match source.fetch_closes(&config.symbol, day, day) {
            Ok(actual_series) => actual_series.last().map(|p| p.close),
            Err(e) => {
                warn!("No actual close for {}: {}", day, e);
                run.add_note(&format!("no actual close for {}", day));
                None
            }
        },
        None => None,
    };
    if let Some(close) = actual {
        run.set_actual_close(close);
    }

    println!(
        "{{\"Prediction\": {:.4}, \"Actual\": {}}}",
        forecast.next_close.predicted,
        actual.map(|c| format!("{:.4}", c)).unwrap_or_else(|| "null".to_string())
    );

    let run_dir = model_logger::create_run_dir(&cli.record_dir)?;
    let record_path = run.save(&run_dir)?;
    println!("Run record saved to {}", record_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config_from(args: &[&str]) -> Result<PipelineConfig> {
        let argv = std::iter::once("close-forecast").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv)?;
        cli.pipeline_config()
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_end_date_moves_compare_date() {
        let config = config_from(&["--end-date", "2023-12-29"]).unwrap();
        assert_eq!(config.end_date, ymd(2023, 12, 29));
        assert_eq!(config.compare_date, Some(ymd(2023, 12, 30)));
    }

    #[test]
    fn test_explicit_compare_date_wins() {
        let config = config_from(&[
            "--end-date",
            "2023-12-29",
            "--compare-date",
            "2024-01-02",
        ])
        .unwrap();
        assert_eq!(config.compare_date, Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn test_no_compare_clears_compare_date() {
        let config = config_from(&["--end-date", "2023-12-29", "--no-compare"]).unwrap();
        assert_eq!(config.compare_date, None);

        assert!(config_from(&["--no-compare", "--compare-date", "2024-01-02"]).is_err());
    }

    #[test]
    fn test_overrides_are_validated() {
        let config =
            config_from(&["--symbol", "msft", "--rmse-formula", "squared-mean-error"]).unwrap();
        assert_eq!(config.symbol, "MSFT");
        assert_eq!(config.rmse_formula, RmseFormula::SquaredMeanError);

        assert!(config_from(&["--split-ratio", "1.0"]).is_err());
        assert!(config_from(&["--end-date", "2010-01-01"]).is_err());
    }
}
