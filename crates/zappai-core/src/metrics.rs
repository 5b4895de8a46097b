//! Evaluation metrics for the climate generator and crop-yield regressor.

use crate::error::{Result, ZappaiError};

fn validate_inputs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ZappaiError::InvalidInput(
            "cannot compute a metric over zero observations".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(ZappaiError::InvalidInput(format!(
            "actual and predicted arrays must have the same length: {} vs {}",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean Squared Error, the climate generator's training loss (spec §4.2).
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root Mean Squared Error, the climate generator's reported validation metric.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mse(actual, predicted)?.sqrt())
}

/// Coefficient of determination, used to report crop-yield regressor fit.
pub fn r2(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot.abs() < f64::EPSILON {
        return Ok(if ss_res.abs() < f64::EPSILON { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mse_is_zero_for_perfect_predictions() {
        let actual = vec![1.0, 2.0, 3.0];
        assert_relative_eq!(mse(&actual, &actual).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rmse_is_sqrt_of_mse() {
        let actual = vec![0.0, 0.0, 0.0];
        let predicted = vec![3.0, 4.0, 0.0];
        assert_relative_eq!(rmse(&actual, &predicted).unwrap(), 5.0 / 3.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn r2_is_one_for_perfect_fit() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2(&actual, &actual).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn r2_is_zero_when_predicting_the_mean() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![2.0, 2.0, 2.0];
        assert_relative_eq!(r2(&actual, &predicted).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(mse(&[1.0, 2.0], &[1.0]).is_err());
    }
}
