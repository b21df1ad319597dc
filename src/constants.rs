// Data source defaults
pub const DEFAULT_SYMBOL: &str = "INTC";
pub const DEFAULT_START_DATE: (i32, u32, u32) = (2013, 7, 3);
pub const DEFAULT_END_DATE: (i32, u32, u32) = (2020, 7, 23);
pub const DEFAULT_COMPARE_DATE: (i32, u32, u32) = (2020, 7, 24);
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Windowing
pub const WINDOW_SIZE: usize = 50; // Number of trading days to look back
pub const TRAIN_SPLIT_RATIO: f64 = 0.7; // 70% of rows go to training

// Model parameters
pub const LSTM_UNITS: usize = 50;
pub const DENSE_UNITS: usize = 25;
pub const INPUT_FEATURES: usize = 1; // close only
pub const OUTPUT_SIZE: usize = 1;

// Training parameters
pub const BATCH_SIZE: usize = 1;
pub const EPOCHS: usize = 1;
pub const LEARNING_RATE: f64 = 0.001;
pub const ADAM_EPSILON: f32 = 1e-7;
pub const PREDICT_BATCH_SIZE: usize = 32;

// Reporting
pub const DEFAULT_SAMPLE_INDEX: usize = 532;
pub const HISTORY_FILE_NAME: &str = "close_history.csv";
pub const PREDICTIONS_FILE_NAME: &str = "model_predictions.csv";
