pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod lstm;
pub mod pipeline;
pub mod predictor;
#[cfg(test)]
pub mod test;
pub mod util {
    pub mod evaluation;
    pub mod model_logger;
    pub mod report;
    pub mod scaler;
    pub mod windowing;
}

/// Compile-time build metadata written by `build.rs`
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use config::PipelineConfig;
pub use error::{ForecastError, Result};
pub use predictor::Predictor;
