//! Feature/target standardization, mirroring `sklearn.preprocessing.StandardScaler`
//! as used in `climate_generative_model_repository.py`: fit on a training slice
//! only, transform all slices with the fitted mean/std, support exact inversion.

use crate::error::{Result, ZappaiError};

/// A per-column standard scaler: `transform(x) = (x - mean) / std`.
/// `std == 0` columns are left unscaled (divide-by-zero guard) the same way
/// scikit-learn's `StandardScaler` clamps degenerate scales to 1.0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit mean/std per column over `rows` (each row has the same width).
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ZappaiError::InvalidInput(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }
        let width = rows[0].len();
        if rows.iter().any(|r| r.len() != width) {
            return Err(ZappaiError::InvalidInput(
                "all rows must have the same number of columns".to_string(),
            ));
        }
        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row.iter()) {
                *m += v / n;
            }
        }
        let mut variance = vec![0.0; width];
        for row in rows {
            for (var, (v, m)) in variance.iter_mut().zip(row.iter().zip(mean.iter())) {
                *var += (v - m).powi(2) / n;
            }
        }
        let scale = variance
            .into_iter()
            .map(|v| {
                let s = v.sqrt();
                if s > f64::EPSILON {
                    s
                } else {
                    1.0
                }
            })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter())
            .zip(self.scale.iter())
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }

    pub fn inverse_transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter())
            .zip(self.scale.iter())
            .map(|((v, m), s)| v * s + m)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fit_computes_mean_and_std_per_column() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_row(&[2.0, 20.0]);
        assert_abs_diff_eq!(scaled[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(scaled[1], 0.0, epsilon = 1e-9);
    }

    /// Scaler invertibility (spec §8 property 5).
    #[test]
    fn inverse_transform_recovers_original_vector() {
        let rows = vec![
            vec![1.0, -4.0, 100.0],
            vec![5.0, 2.0, 80.0],
            vec![3.0, 0.0, 120.0],
            vec![9.0, 3.5, 60.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();
        for row in &rows {
            let roundtrip = scaler.inverse_transform_row(&scaler.transform_row(row));
            for (a, b) in row.iter().zip(roundtrip.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let rows = vec![vec![5.0], vec![5.0], vec![5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_row(&[5.0]);
        assert_abs_diff_eq!(scaled[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
