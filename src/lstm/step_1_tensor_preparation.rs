// External crates
use burn::tensor::{backend::Backend, Tensor, TensorData};

// Internal modules
use crate::error::{ForecastError, Result};

/// Converts windows of scaled closes into a `[batch, window, 1]` tensor
///
/// # Arguments
///
/// * `windows` - Equal-length windows of scaled closes
/// * `device` - Device to place the tensor on
///
/// # Returns
///
/// The feature tensor, or a `Computation` error for empty or ragged input
pub fn windows_to_tensor<B: Backend>(windows: &[Vec<f64>], device: &B::Device) -> Result<Tensor<B, 3>> {
    let batch_size = windows.len();
    let window_size = windows.first().map(|w| w.len()).unwrap_or(0);

    if batch_size == 0 || window_size == 0 {
        return Err(ForecastError::Computation(
            "cannot build a tensor from empty windows".to_string(),
        ));
    }
    if let Some(bad) = windows.iter().find(|w| w.len() != window_size) {
        return Err(ForecastError::Computation(format!(
            "ragged windows: expected length {}, found {}",
            window_size,
            bad.len()
        )));
    }

    let data: Vec<f32> = windows
        .iter()
        .flat_map(|w| w.iter().map(|&v| v as f32))
        .collect();

    Ok(Tensor::<B, 3>::from_data(
        TensorData::new(data, [batch_size, window_size, 1]),
        device,
    ))
}

/// Converts scalar targets into a `[batch, 1]` tensor
pub fn targets_to_tensor<B: Backend>(targets: &[f64], device: &B::Device) -> Result<Tensor<B, 2>> {
    if targets.is_empty() {
        return Err(ForecastError::Computation(
            "cannot build a tensor from empty targets".to_string(),
        ));
    }

    let data: Vec<f32> = targets.iter().map(|&v| v as f32).collect();
    Ok(Tensor::<B, 2>::from_data(
        TensorData::new(data, [targets.len(), 1]),
        device,
    ))
}

/// Gather the rows named by `indices` into a feature batch and a target batch
pub fn batch_from_indices<B: Backend>(
    windows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    device: &B::Device,
) -> Result<(Tensor<B, 3>, Tensor<B, 2>)> {
    let batch_windows: Vec<Vec<f64>> = indices.iter().map(|&i| windows[i].clone()).collect();
    let batch_targets: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();

    Ok((
        windows_to_tensor::<B>(&batch_windows, device)?,
        targets_to_tensor::<B>(&batch_targets, device)?,
    ))
}

/// Flatten a `[batch, 1]` output tensor into one value per row
pub fn tensor_to_values<B: Backend>(output: Tensor<B, 2>) -> Result<Vec<f64>> {
    let values = output
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| ForecastError::Computation(format!("failed to read predictions: {:?}", e)))?;

    let values: Vec<f64> = values.into_iter().map(f64::from).collect();
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ForecastError::Computation(format!(
            "model produced a non-finite value ({})",
            bad
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::{NdArray, NdArrayDevice};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_windows_to_tensor_shape_and_order() {
        let device = NdArrayDevice::Cpu;
        let windows = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]];

        let tensor = windows_to_tensor::<TestBackend>(&windows, &device).unwrap();
        assert_eq!(tensor.dims(), [2, 3, 1]);

        let values = tensor.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_windows_to_tensor_rejects_ragged() {
        let device = NdArrayDevice::Cpu;
        let windows = vec![vec![0.1, 0.2], vec![0.3]];
        assert!(windows_to_tensor::<TestBackend>(&windows, &device).is_err());
        assert!(windows_to_tensor::<TestBackend>(&[], &device).is_err());
    }

    #[test]
    fn test_batch_from_indices_picks_rows() {
        let device = NdArrayDevice::Cpu;
        let windows = vec![vec![0.0, 0.1], vec![0.2, 0.3], vec![0.4, 0.5]];
        let targets = vec![0.2, 0.4, 0.6];

        let (features, batch_targets) =
            batch_from_indices::<TestBackend>(&windows, &targets, &[2, 0], &device).unwrap();
        assert_eq!(features.dims(), [2, 2, 1]);
        assert_eq!(batch_targets.dims(), [2, 1]);

        let picked = tensor_to_values(batch_targets).unwrap();
        assert!((picked[0] - 0.6).abs() < 1e-6);
        assert!((picked[1] - 0.2).abs() < 1e-6);
    }
}
