//! Gradient boosted regression trees

use crate::error::Result;
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Gradient boosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    pub n_estimators: usize,
    /// Shrinkage applied to each tree's contribution
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsample ratio per boosting round
    pub subsample: f64,
    /// Column subsample ratio per boosting round
    pub colsample_bytree: f64,
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: Some(42),
        }
    }
}

/// Boosted ensemble: each round fits a tree to the current residuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_prediction: f64,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_prediction: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        self.initial_prediction = y.mean().unwrap_or(0.0);
        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.trees.clear();
        self.col_indices_per_tree.clear();

        for _ in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(yi, pi)| yi - pi)
                .collect();

            let row_indices = sample_indices(n_samples, self.config.subsample, &mut rng);
            let col_indices = sample_indices(n_features, self.config.colsample_bytree, &mut rng);

            let x_rows = x.select(ndarray::Axis(0), &row_indices);
            let x_sub = x_rows.select(ndarray::Axis(1), &col_indices);
            let y_sub: Array1<f64> =
                Array1::from_vec(row_indices.iter().map(|&i| residuals[i]).collect());

            let mut tree = DecisionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            // Update running predictions on all rows, not just the sample
            let x_all_sub = x.select(ndarray::Axis(1), &col_indices);
            let tree_pred = tree.predict(&x_all_sub)?;
            for i in 0..n_samples {
                predictions[i] += self.config.learning_rate * tree_pred[i];
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(col_indices);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(crate::error::PipelineError::NotFitted);
        }

        let n = x.nrows();
        let mut predictions = Array1::from_elem(n, self.initial_prediction);

        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(ndarray::Axis(1), col_indices);
            let tree_pred = tree.predict(&x_sub)?;
            for i in 0..n {
                predictions[i] += self.config.learning_rate * tree_pred[i];
            }
        }

        Ok(predictions)
    }
}

/// Draw `ratio * n` distinct indices, sorted for stable selection order.
fn sample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let sample_size = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::r2_score;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let n = 80;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i as f64) * 0.1 + j as f64);
        let y = Array1::from_shape_fn(n, |i| {
            let v = i as f64 * 0.1;
            v * 3.0 + (v * 2.0).sin()
        });
        (x, y)
    }

    #[test]
    fn test_boosting_fits_smooth_target() {
        let (x, y) = training_data();
        let config = GradientBoostingConfig {
            n_estimators: 50,
            ..Default::default()
        };
        let mut model = GradientBoostingRegressor::new(config);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert!(r2_score(&y, &preds) > 0.9);
    }

    #[test]
    fn test_subsampling_still_learns() {
        let (x, y) = training_data();
        let config = GradientBoostingConfig {
            n_estimators: 50,
            subsample: 0.7,
            colsample_bytree: 0.5,
            ..Default::default()
        };
        let mut model = GradientBoostingRegressor::new(config);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert!(r2_score(&y, &preds) > 0.7);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = GradientBoostingRegressor::new(GradientBoostingConfig::default());
        assert!(model.predict(&Array2::zeros((1, 2))).is_err());
    }
}
