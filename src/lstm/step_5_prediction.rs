// External imports
use burn::module::AutodiffModule;
use burn::tensor::backend::{AutodiffBackend, Backend};
use log::{debug, info};
use std::time::Instant;

// Internal imports
use super::step_1_tensor_preparation::{tensor_to_values, windows_to_tensor};
use super::step_3_lstm_model_arch::{StackedLstm, StackedLstmConfig};
use super::step_4_train_model::{train_model, TrainingConfig};
use crate::constants::PREDICT_BATCH_SIZE;
use crate::error::{ForecastError, Result};
use crate::predictor::Predictor;

/// Run the model over `windows` in fixed-size batches
///
/// # Arguments
///
/// * `model` - Trained model (on a non-autodiff backend)
/// * `windows` - Scaled input windows
/// * `device` - Device to place tensors on
///
/// # Returns
///
/// One scaled prediction per window
pub fn predict_windows<B: Backend>(
    model: &StackedLstm<B>,
    windows: &[Vec<f64>],
    device: &B::Device,
) -> Result<Vec<f64>> {
    let mut predictions = Vec::with_capacity(windows.len());

    for batch in windows.chunks(PREDICT_BATCH_SIZE) {
        let features = windows_to_tensor::<B>(batch, device)?;
        let output = model.forward(features);
        predictions.extend(tensor_to_values(output)?);
    }

    Ok(predictions)
}

/// `Predictor` backed by the stacked LSTM
///
/// Training runs on the autodiff backend `B`; prediction uses the trained
/// weights on `B::InnerBackend`.
pub struct LstmPredictor<B: AutodiffBackend> {
    model_config: StackedLstmConfig,
    training: TrainingConfig,
    device: B::Device,
    model: Option<StackedLstm<B::InnerBackend>>,
    loss_history: Vec<f64>,
    training_seconds: f64,
}

impl<B: AutodiffBackend> LstmPredictor<B> {
    pub fn new(model_config: StackedLstmConfig, training: TrainingConfig, device: B::Device) -> Self {
        Self {
            model_config,
            training,
            device,
            model: None,
            loss_history: Vec::new(),
            training_seconds: 0.0,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Mean loss per epoch of the last training run
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    /// Wall-clock duration of the last training run
    pub fn training_seconds(&self) -> f64 {
        self.training_seconds
    }
}

impl<B: AutodiffBackend> Predictor for LstmPredictor<B> {
    fn train(
        &mut self,
        windows: &[Vec<f64>],
        targets: &[f64],
        batch_size: usize,
        epochs: usize,
    ) -> Result<()> {
        if let Some(seed) = self.training.seed {
            B::seed(seed);
        }

        let config = TrainingConfig {
            batch_size,
            epochs,
            ..self.training.clone()
        };
        let model = self.model_config.init::<B>(&self.device);
        debug!("Initialised model: {:?}", self.model_config);

        let started = Instant::now();
        let (trained, history) = train_model::<B>(model, windows, targets, &config, &self.device)?;
        self.training_seconds = started.elapsed().as_secs_f64();
        info!("Training finished in {:.1}s", self.training_seconds);

        self.model = Some(trained.valid());
        self.loss_history = history;
        Ok(())
    }

    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or_else(|| {
            ForecastError::Computation("model has not been trained".to_string())
        })?;
        if windows.is_empty() {
            return Ok(Vec::new());
        }
        predict_windows::<B::InnerBackend>(model, windows, &self.device)
    }
}
