//! Stacked LSTM next-close regressor on Burn

pub mod step_1_tensor_preparation;
pub mod step_2_lstm_cell;
pub mod step_3_lstm_model_arch;
pub mod step_4_train_model;
pub mod step_5_prediction;

use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;

pub use step_3_lstm_model_arch::{StackedLstm, StackedLstmConfig};
pub use step_4_train_model::TrainingConfig;
pub use step_5_prediction::LstmPredictor;

/// CPU backend used for inference
pub type InferenceBackend = NdArray<f32>;
/// CPU backend with autodiff used for training
pub type TrainingBackend = Autodiff<InferenceBackend>;
