//! Crop-yield regressor: a random forest mapping a sowing/harvest window's
//! climate statistics to yield per hectare.
//!
//! Grounded in `tesi/zappai/repositories/crop_yield_model_repository.py`
//! (`train_model`: z-score outlier filtering, 80/20 shuffled split,
//! `RandomForestRegressor(n_estimators=100, min_samples_split=50)`).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{RandomForestRegressor, RandomForestRegressorParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::crop::CropYieldObservation;
use crate::error::{Result, ZappaiError};
use crate::features::regressor_feature_width;
use crate::metrics::{mse, r2};

/// Observations with a |z-score| at or above this threshold are dropped
/// before training, on top of any source-flagged outliers (spec §3).
const Z_SCORE_OUTLIER_THRESHOLD: f64 = 3.0;
const TEST_FRACTION: f64 = 0.2;
const SPLIT_SEED: u64 = 42;
const N_TREES: usize = 100;
const MIN_SAMPLES_SPLIT: usize = 50;

/// A trained crop-yield regressor, tied to the feature-column layout it was
/// fit on.
#[derive(Serialize, Deserialize)]
pub struct CropYieldRegressor {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    feature_width: usize,
    pub test_mse: f64,
    pub test_r2: f64,
}

fn filter_outliers(observations: &[(CropYieldObservation, Vec<f64>)]) -> Vec<(CropYieldObservation, Vec<f64>)> {
    let retained: Vec<_> = observations
        .iter()
        .filter(|(obs, _)| !obs.is_outlier)
        .cloned()
        .collect();
    if retained.len() < 2 {
        return retained;
    }
    let yields: Vec<f64> = retained.iter().map(|(obs, _)| obs.yield_per_hectare).collect();
    let mean = yields.iter().sum::<f64>() / yields.len() as f64;
    let variance = yields.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / yields.len() as f64;
    let std = variance.sqrt();
    if std < f64::EPSILON {
        return retained;
    }
    retained
        .into_iter()
        .filter(|(obs, _)| ((obs.yield_per_hectare - mean) / std).abs() < Z_SCORE_OUTLIER_THRESHOLD)
        .collect()
}

impl CropYieldRegressor {
    /// Trains on `rows`: each observation paired with its already-assembled
    /// feature row (see [`crate::features::regressor_feature_row`]). Applies
    /// the two-stage outlier policy, then an 80/20 fixed-seed shuffled split.
    pub fn train(rows: Vec<(CropYieldObservation, Vec<f64>)>) -> Result<Self> {
        let expected_width = regressor_feature_width();
        if rows.iter().any(|(_, f)| f.len() != expected_width) {
            return Err(ZappaiError::InvalidInput(format!(
                "all feature rows must have width {expected_width}"
            )));
        }
        let filtered = filter_outliers(&rows);
        if filtered.len() < 10 {
            return Err(ZappaiError::InvalidInput(
                "not enough crop yield observations remain after outlier filtering".to_string(),
            ));
        }

        let mut indices: Vec<usize> = (0..filtered.len()).collect();
        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        indices.shuffle(&mut rng);
        let test_count = ((filtered.len() as f64) * TEST_FRACTION).round() as usize;
        let (test_idx, train_idx) = indices.split_at(test_count);

        let gather = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            let x = idx.iter().map(|&i| filtered[i].1.clone()).collect();
            let y = idx.iter().map(|&i| filtered[i].0.yield_per_hectare).collect();
            (x, y)
        };
        let (train_x, train_y) = gather(train_idx);
        let (test_x, test_y) = gather(test_idx);

        let train_matrix = DenseMatrix::from_2d_vec(&train_x);
        let parameters = RandomForestRegressorParameters::default()
            .with_n_trees(N_TREES)
            .with_min_samples_split(MIN_SAMPLES_SPLIT)
            .with_seed(SPLIT_SEED);
        let model = RandomForestRegressor::fit(&train_matrix, &train_y, parameters)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;

        let test_matrix = DenseMatrix::from_2d_vec(&test_x);
        let predicted = model
            .predict(&test_matrix)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        let test_mse = mse(&test_y, &predicted)?;
        let test_r2 = r2(&test_y, &predicted)?;

        Ok(Self {
            model,
            feature_width: expected_width,
            test_mse,
            test_r2,
        })
    }

    /// Predicts yield per hectare for one feature row (spec §8 property 10:
    /// the row must match the width the model was trained on).
    pub fn predict(&self, feature_row: &[f64]) -> Result<f64> {
        if feature_row.len() != self.feature_width {
            return Err(ZappaiError::InvalidInput(format!(
                "expected a feature row of width {}, got {}",
                self.feature_width,
                feature_row.len()
            )));
        }
        let matrix = DenseMatrix::from_2d_vec(&vec![feature_row.to_vec()]);
        let predicted = self
            .model
            .predict(&matrix)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        Ok(predicted[0])
    }

    /// Serializes the trained model (per-crop persisted artifact, spec §6's
    /// nullable serialized-regressor column) to a `bincode` byte string.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ZappaiError::ComputationError(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| ZappaiError::ComputationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use uuid::Uuid;

    fn synthetic_rows(n: usize) -> Vec<(CropYieldObservation, Vec<f64>)> {
        let width = regressor_feature_width();
        (0..n)
            .map(|i| {
                let obs = CropYieldObservation {
                    location_id: Uuid::nil(),
                    crop_id: Uuid::nil(),
                    sowing: YearMonth::new(2000, 1),
                    harvest: YearMonth::new(2000, 6),
                    yield_per_hectare: 3.0 + (i % 5) as f64 * 0.1,
                    is_outlier: false,
                };
                let features = vec![(i % 7) as f64; width];
                (obs, features)
            })
            .collect()
    }

    /// Spec §8 property 10: prediction rejects a feature row of the wrong width.
    #[test]
    fn predict_rejects_mismatched_feature_width() {
        let rows = synthetic_rows(60);
        let regressor = CropYieldRegressor::train(rows).unwrap();
        let err = regressor.predict(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ZappaiError::InvalidInput(_)));
    }

    #[test]
    fn to_bytes_round_trip_preserves_predictions() {
        let rows = synthetic_rows(60);
        let regressor = CropYieldRegressor::train(rows).unwrap();
        let row = vec![2.0; regressor_feature_width()];
        let expected = regressor.predict(&row).unwrap();

        let bytes = regressor.to_bytes().unwrap();
        let restored = CropYieldRegressor::from_bytes(&bytes).unwrap();
        assert_eq!(restored.predict(&row).unwrap(), expected);
        assert_eq!(restored.test_mse, regressor.test_mse);
    }

    #[test]
    fn training_filters_flagged_outliers() {
        let mut rows = synthetic_rows(60);
        rows[0].0.is_outlier = true;
        rows[0].0.yield_per_hectare = 1_000_000.0;
        let regressor = CropYieldRegressor::train(rows).unwrap();
        assert!(regressor.test_mse.is_finite());
    }
}
