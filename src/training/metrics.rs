//! Regression metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// R² (coefficient of determination). Returns 0.0 for a constant target,
/// where the ratio is undefined.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let y_mean = y_true.sum() / n;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Full regression metric set for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2: r2_score(y_true, y_pred),
            n_samples: y_true.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_fit() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y), 1.0);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let y = array![1.0, 2.0, 3.0];
        let pred = array![2.0, 2.0, 2.0];
        assert!(r2_score(&y, &pred).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let y = array![5.0, 5.0, 5.0];
        let pred = array![4.0, 5.0, 6.0];
        assert_eq!(r2_score(&y, &pred), 0.0);
    }

    #[test]
    fn test_metrics_compute() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred);
        assert!(metrics.r2 > 0.9);
        assert!(metrics.mse < 0.1);
        assert!((metrics.rmse - metrics.mse.sqrt()).abs() < 1e-12);
        assert_eq!(metrics.n_samples, 5);
    }
}
