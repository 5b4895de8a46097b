//! Per-window summary statistics used as crop-yield regressor features.
//!
//! Grounded in `tesi/zappai/utils/common.py::create_stats_dataframe`, which
//! reduces each climate variable's monthly window to `mean`, `std`, `min`,
//! `max` before feeding it to the regressor (spec §4.3).

use crate::error::{Result, ZappaiError};

/// The four aggregate statistics computed per climate variable per window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl WindowStats {
    /// Flatten in the fixed `[mean, std, min, max]` column order the
    /// regressor's feature vector relies on (spec §8 property 10).
    pub fn as_array(&self) -> [f64; 4] {
        [self.mean, self.std, self.min, self.max]
    }
}

/// Compute `WindowStats` over a non-empty window of values.
pub fn compute_window_stats(values: &[f64]) -> Result<WindowStats> {
    if values.is_empty() {
        return Err(ZappaiError::InvalidInput(
            "cannot compute window statistics over zero values".to_string(),
        ));
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok(WindowStats { mean, std, min, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn computes_mean_std_min_max() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = compute_window_stats(&values).unwrap();
        assert_relative_eq!(stats.mean, 3.0, epsilon = 1e-10);
        assert_relative_eq!(stats.std, 2.0_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(stats.min, 1.0, epsilon = 1e-10);
        assert_relative_eq!(stats.max, 5.0, epsilon = 1e-10);
    }

    #[test]
    fn single_value_window_has_zero_std() {
        let stats = compute_window_stats(&[7.0]).unwrap();
        assert_relative_eq!(stats.mean, 7.0, epsilon = 1e-10);
        assert_relative_eq!(stats.std, 0.0, epsilon = 1e-10);
        assert_relative_eq!(stats.min, 7.0, epsilon = 1e-10);
        assert_relative_eq!(stats.max, 7.0, epsilon = 1e-10);
    }

    #[test]
    fn empty_window_is_rejected() {
        assert!(compute_window_stats(&[]).is_err());
    }

    #[test]
    fn as_array_orders_columns_mean_std_min_max() {
        let stats = WindowStats {
            mean: 1.0,
            std: 2.0,
            min: 3.0,
            max: 4.0,
        };
        assert_eq!(stats.as_array(), [1.0, 2.0, 3.0, 4.0]);
    }
}
