// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

// Internal imports
use super::step_2_lstm_cell::LstmLayer;
use crate::constants::{DENSE_UNITS, INPUT_FEATURES, LSTM_UNITS, OUTPUT_SIZE};

/// Two stacked LSTM layers followed by two dense layers
///
/// The first LSTM feeds its whole hidden sequence to the second, whose last
/// hidden state goes through `dense` and then `output`.
#[derive(Module, Debug)]
pub struct StackedLstm<B: Backend> {
    lstm_units: usize,
    sequence_lstm: LstmLayer<B>,
    final_lstm: LstmLayer<B>,
    dense: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> StackedLstm<B> {
    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch_size, window_size, input_size]
    ///
    /// # Returns
    ///
    /// Predictions of shape [batch_size, output_size]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let sequence = self.sequence_lstm.forward(x);
        let sequence = self.final_lstm.forward(sequence);

        let [batch_size, seq_len, _] = sequence.dims();
        let last_step = sequence
            .narrow(1, seq_len - 1, 1)
            .reshape([batch_size, self.lstm_units]);

        // Both dense layers are linear, no activation in between
        let hidden = self.dense.forward(last_step);
        self.output.forward(hidden)
    }
}

/// Configuration for the StackedLstm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedLstmConfig {
    pub input_size: usize,
    pub lstm_units: usize,
    pub dense_units: usize,
    pub output_size: usize,
}

impl Default for StackedLstmConfig {
    fn default() -> Self {
        Self {
            input_size: INPUT_FEATURES,
            lstm_units: LSTM_UNITS,
            dense_units: DENSE_UNITS,
            output_size: OUTPUT_SIZE,
        }
    }
}

impl StackedLstmConfig {
    pub fn new(lstm_units: usize, dense_units: usize) -> Self {
        Self {
            lstm_units,
            dense_units,
            ..Self::default()
        }
    }

    /// Initialize a model from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> StackedLstm<B> {
        StackedLstm {
            lstm_units: self.lstm_units,
            sequence_lstm: LstmLayer::new(self.input_size, self.lstm_units, device),
            final_lstm: LstmLayer::new(self.lstm_units, self.lstm_units, device),
            dense: LinearConfig::new(self.lstm_units, self.dense_units).init(device),
            output: LinearConfig::new(self.dense_units, self.output_size).init(device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::{NdArray, NdArrayDevice};

    #[test]
    fn test_default_config_matches_reference_layers() {
        let config = StackedLstmConfig::default();
        assert_eq!(config.input_size, 1);
        assert_eq!(config.lstm_units, 50);
        assert_eq!(config.dense_units, 25);
        assert_eq!(config.output_size, 1);
    }

    #[test]
    fn test_forward_one_value_per_window() {
        let _guard = crate::test::backend_rng_guard();
        let device = NdArrayDevice::Cpu;
        let model = StackedLstmConfig::new(6, 3).init::<NdArray<f32>>(&device);

        let x = Tensor::<NdArray<f32>, 3>::zeros([5, 10, 1], &device);
        let out = model.forward(x);

        assert_eq!(out.dims(), [5, 1]);
    }
}
