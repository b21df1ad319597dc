// External crates
use log::debug;

// Internal modules
use crate::error::{ForecastError, Result};

/// Supervised (window, next value) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupervisedSet {
    pub windows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl SupervisedSet {
    pub fn len(&self) -> usize {
        self.windows.len()
    }
}

/// Scaled series partitioned into training pairs and test windows
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSplit {
    /// Number of leading rows reserved for training
    pub training_length: usize,
    pub train: SupervisedSet,
    /// One window per row in `[training_length, len)`; the first window's
    /// lookback reaches back into the training rows
    pub test: SupervisedSet,
}

/// Number of rows in the training partition: `ceil(split_ratio * len)`
pub fn training_length(len: usize, split_ratio: f64) -> usize {
    let rows = (len as f64 * split_ratio).ceil() as usize;
    rows.min(len)
}

/// Slide a window of `window_size` over `series`
///
/// # Arguments
///
/// * `series` - Scaled values in time order
/// * `window_size` - Lookback length
///
/// # Returns
///
/// `len - window_size` pairs where pair `k` is `series[k..k + window_size]`
/// followed by `series[k + window_size]`; `InsufficientData` if the series is
/// not longer than the window
pub fn sliding_windows(series: &[f64], window_size: usize) -> Result<SupervisedSet> {
    if window_size == 0 {
        return Err(ForecastError::InvalidConfig(
            "window size must be at least 1".to_string(),
        ));
    }
    if series.len() <= window_size {
        return Err(ForecastError::InsufficientData {
            required: window_size,
            available: series.len(),
        });
    }

    let mut set = SupervisedSet::default();
    for i in window_size..series.len() {
        set.windows.push(series[i - window_size..i].to_vec());
        set.targets.push(series[i]);
    }
    Ok(set)
}

/// Build training pairs and test windows from a scaled series
///
/// Training pairs end before `training_length`. Test windows are taken from
/// `scaled[training_length - window_size..]` so there is exactly one per
/// validation row.
pub fn split_windows(scaled: &[f64], window_size: usize, split_ratio: f64) -> Result<WindowedSplit> {
    if !(split_ratio > 0.0 && split_ratio < 1.0) {
        return Err(ForecastError::InvalidConfig(format!(
            "split ratio must be in (0, 1) so both partitions have rows, got {}",
            split_ratio
        )));
    }
    if scaled.len() <= window_size {
        return Err(ForecastError::InsufficientData {
            required: window_size,
            available: scaled.len(),
        });
    }

    let training_length = training_length(scaled.len(), split_ratio);
    // At least one training pair is needed to fit anything
    if training_length <= window_size {
        return Err(ForecastError::InsufficientData {
            required: window_size,
            available: training_length,
        });
    }
    if training_length == scaled.len() {
        return Err(ForecastError::InsufficientData {
            required: training_length,
            available: scaled.len(),
        });
    }

    let train = sliding_windows(&scaled[..training_length], window_size)?;
    let test = sliding_windows(&scaled[training_length - window_size..], window_size)?;

    debug!(
        "Split {} rows at {}: {} training windows, {} test windows",
        scaled.len(),
        training_length,
        train.len(),
        test.len()
    );

    Ok(WindowedSplit {
        training_length,
        train,
        test,
    })
}

/// The last `window_size` values of the whole series, used for the next-day forecast
pub fn latest_window(scaled: &[f64], window_size: usize) -> Result<Vec<f64>> {
    if window_size == 0 || scaled.len() < window_size {
        return Err(ForecastError::InsufficientData {
            required: window_size,
            available: scaled.len(),
        });
    }
    Ok(scaled[scaled.len() - window_size..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (1..=len).map(|v| v as f64).collect()
    }

    #[test]
    fn test_training_length_rounds_up() {
        assert_eq!(training_length(1000, 0.7), 700);
        assert_eq!(training_length(3, 0.7), 3);
        assert_eq!(training_length(110, 0.7), 77);
    }

    #[test]
    fn test_sliding_windows_count_and_targets() {
        let series = ramp(60);
        let set = sliding_windows(&series, 50).unwrap();

        assert_eq!(set.len(), 10);
        assert_eq!(set.windows[0], series[0..50].to_vec());
        assert_eq!(set.targets[0], 51.0);
        assert_eq!(set.targets[9], 60.0);
        assert!(set.windows.iter().all(|w| w.len() == 50));
    }

    #[test]
    fn test_sliding_windows_too_short() {
        assert!(matches!(
            sliding_windows(&ramp(50), 50),
            Err(ForecastError::InsufficientData { required: 50, available: 50 })
        ));
        assert!(matches!(
            sliding_windows(&ramp(10), 50),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_split_windows_ramp_of_110() {
        let series = ramp(110);
        let split = split_windows(&series, 50, 0.7).unwrap();

        assert_eq!(split.training_length, 77);
        assert_eq!(split.train.len(), 27);
        assert_eq!(split.test.len(), 33);
        assert_eq!(split.train.len() + split.test.len(), 110 - 50);

        // Last training target is the final training row
        assert_eq!(*split.train.targets.last().unwrap(), 77.0);
        // First test window overlaps the tail of the training rows
        assert_eq!(split.test.windows[0], series[27..77].to_vec());
        assert_eq!(split.test.targets[0], 78.0);
        assert_eq!(*split.test.targets.last().unwrap(), 110.0);
    }

    #[test]
    fn test_split_windows_needs_training_pairs() {
        // ceil(60 * 0.5) = 30 rows cannot hold a 50-day window
        assert!(matches!(
            split_windows(&ramp(60), 50, 0.5),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_split_windows_needs_test_rows() {
        // ceil(60 * 0.99) = 60 leaves nothing to validate on
        assert!(matches!(
            split_windows(&ramp(60), 50, 0.99),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_split_windows_rejects_bad_ratio() {
        assert!(matches!(
            split_windows(&ramp(200), 50, 0.0),
            Err(ForecastError::InvalidConfig(_))
        ));
        assert!(matches!(
            split_windows(&ramp(200), 50, 1.5),
            Err(ForecastError::InvalidConfig(_))
        ));
        assert!(matches!(
            split_windows(&ramp(110), 50, 1.0),
            Err(ForecastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_latest_window_uses_tail() {
        let series = ramp(110);
        let window = latest_window(&series, 50).unwrap();
        assert_eq!(window.first(), Some(&61.0));
        assert_eq!(window.last(), Some(&110.0));
        assert!(latest_window(&series[..10], 50).is_err());
    }
}
