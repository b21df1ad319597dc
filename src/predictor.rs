use crate::error::Result;

/// A sequence regressor mapping a window of scaled closes to the next scaled close
///
/// The pipeline only relies on this contract; `lstm::LstmPredictor` is the
/// shipped implementation.
pub trait Predictor {
    /// Fit on `windows` / `targets` in one blocking call
    ///
    /// Calling it again starts over from a fresh model.
    fn train(
        &mut self,
        windows: &[Vec<f64>],
        targets: &[f64],
        batch_size: usize,
        epochs: usize,
    ) -> Result<()>;

    /// One prediction per window, in window order
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>>;
}
