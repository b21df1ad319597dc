// External imports
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

// Internal imports
use super::step_1_tensor_preparation::batch_from_indices;
use super::step_3_lstm_model_arch::StackedLstm;
use crate::constants::{ADAM_EPSILON, BATCH_SIZE, EPOCHS, LEARNING_RATE};
use crate::error::{ForecastError, Result};

/// Configuration for training the model
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub epochs: usize,
    /// Reshuffle the training windows every epoch
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: LEARNING_RATE,
            batch_size: BATCH_SIZE,
            epochs: EPOCHS,
            shuffle: true,
            seed: None,
        }
    }
}

/// Train the model on windows and next-day targets with Adam and an MSE loss
///
/// # Arguments
///
/// * `model` - Freshly initialised model
/// * `windows` - Scaled training windows
/// * `targets` - Scaled value following each window
/// * `config` - Training configuration
/// * `device` - Device to train on
///
/// # Returns
///
/// The trained model and the mean loss of each epoch
pub fn train_model<B: AutodiffBackend>(
    mut model: StackedLstm<B>,
    windows: &[Vec<f64>],
    targets: &[f64],
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<(StackedLstm<B>, Vec<f64>)> {
    if windows.len() != targets.len() {
        return Err(ForecastError::Computation(format!(
            "{} training windows but {} targets",
            windows.len(),
            targets.len()
        )));
    }
    if windows.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    if config.batch_size == 0 || config.epochs == 0 {
        return Err(ForecastError::InvalidConfig(
            "batch size and epochs must be at least 1".to_string(),
        ));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut optimizer = AdamConfig::new()
        .with_epsilon(ADAM_EPSILON)
        .init::<B, StackedLstm<B>>();

    let num_samples = windows.len();
    let mut indices: Vec<usize> = (0..num_samples).collect();
    let mut loss_history = Vec::with_capacity(config.epochs);

    info!(
        "Training on {} windows (batch size {}, {} epochs)",
        num_samples, config.batch_size, config.epochs
    );

    for epoch in 1..=config.epochs {
        if config.shuffle {
            indices.shuffle(&mut rng);
        }

        let mut epoch_loss = 0.0;
        let mut num_batches = 0usize;

        for batch_indices in indices.chunks(config.batch_size) {
            let (features, batch_targets) =
                batch_from_indices::<B>(windows, targets, batch_indices, device)?;

            // Forward pass and MSE
            let predictions = model.forward(features);
            let diff = predictions - batch_targets;
            let loss_tensor = (diff.clone() * diff).mean();
            let loss = loss_tensor.clone().into_scalar().elem::<f64>();

            if !loss.is_finite() {
                return Err(ForecastError::Computation(format!(
                    "loss became {} in epoch {}",
                    loss, epoch
                )));
            }
            epoch_loss += loss;
            num_batches += 1;

            // Backward pass and optimizer step
            let grads = loss_tensor.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(config.learning_rate, model, grads);

            if num_batches % 250 == 0 {
                debug!("epoch {} batch {}: loss {:.6}", epoch, num_batches, loss);
            }
        }

        let avg_loss = epoch_loss / num_batches as f64;
        info!("Epoch {}/{} - loss: {:.6}", epoch, config.epochs, avg_loss);
        loss_history.push(avg_loss);
    }

    Ok((model, loss_history))
}
