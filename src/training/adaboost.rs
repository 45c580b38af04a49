//! AdaBoost.R2 regressor
//!
//! Each round fits a shallow regression tree on a weighted bootstrap
//! resample, computes the linear loss of that learner over all samples,
//! and reweights toward the samples it got most wrong. Prediction is the
//! weighted median of the learners' outputs.

use crate::error::{PipelineError, Result};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Depth of each weak learner
    pub max_depth: usize,
    pub random_state: Option<u64>,
    learners: Vec<DecisionTree>,
    /// log(1 / beta) per learner; larger means more trusted
    alphas: Vec<f64>,
    is_fitted: bool,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth: 3,
            random_state: None,
            learners: Vec::new(),
            alphas: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::Shape {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::Training("empty training set".to_string()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);

        self.learners.clear();
        self.alphas.clear();

        for _round in 0..self.n_estimators {
            // Weighted bootstrap via inverse-CDF sampling
            let cdf = cumulative(&weights);
            let sample_indices: Vec<usize> = (0..n_samples)
                .map(|_| draw(&cdf, rng.gen::<f64>()))
                .collect();

            let x_boot = x.select(ndarray::Axis(0), &sample_indices);
            let y_boot: Array1<f64> =
                Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

            let mut learner = DecisionTree::new().with_max_depth(self.max_depth);
            learner.fit(&x_boot, &y_boot)?;

            let predictions = learner.predict(x)?;
            let abs_errors: Array1<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(t, p)| (t - p).abs())
                .collect();

            let max_error = abs_errors.iter().cloned().fold(0.0f64, f64::max);
            if max_error <= 1e-12 {
                // Learner is already exact; trust it fully and stop
                self.learners.push(learner);
                self.alphas.push(1.0);
                break;
            }

            // Linear loss per sample, in [0, 1]
            let losses = abs_errors.mapv(|e| e / max_error);
            let avg_loss: f64 = weights
                .iter()
                .zip(losses.iter())
                .map(|(w, l)| w * l)
                .sum();

            if avg_loss >= 0.5 {
                // Worse than random reweighting can fix; keep a first
                // learner so the ensemble is never empty
                if self.learners.is_empty() {
                    self.learners.push(learner);
                    self.alphas.push(1.0);
                }
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);
            let alpha = self.learning_rate * (1.0 / beta).ln();

            // Low-loss samples shrink, high-loss samples keep their weight
            for i in 0..n_samples {
                weights[i] *= beta.powf(self.learning_rate * (1.0 - losses[i]));
            }
            let w_sum = weights.sum();
            if w_sum > 0.0 {
                weights /= w_sum;
            }

            self.learners.push(learner);
            self.alphas.push(alpha);
        }

        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted || self.learners.is_empty() {
            return Err(PipelineError::NotFitted);
        }

        let per_learner: Vec<Array1<f64>> = self
            .learners
            .iter()
            .map(|l| l.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let n_samples = x.nrows();
        let half_weight: f64 = self.alphas.iter().sum::<f64>() / 2.0;

        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                // Weighted median across learners
                let mut pairs: Vec<(f64, f64)> = per_learner
                    .iter()
                    .zip(self.alphas.iter())
                    .map(|(preds, &alpha)| (preds[i], alpha))
                    .collect();
                pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

                let mut acc = 0.0;
                for (value, alpha) in &pairs {
                    acc += alpha;
                    if acc >= half_weight {
                        return *value;
                    }
                }
                pairs.last().map(|(v, _)| *v).unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

fn cumulative(weights: &Array1<f64>) -> Vec<f64> {
    let mut cdf = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    for &w in weights {
        acc += w;
        cdf.push(acc);
    }
    cdf
}

fn draw(cdf: &[f64], u: f64) -> usize {
    let target = u * cdf.last().copied().unwrap_or(1.0);
    match cdf.binary_search_by(|probe| probe.partial_cmp(&target).unwrap()) {
        Ok(i) => i,
        Err(i) => i.min(cdf.len() - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::r2_score;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let n = 80;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i as f64) * 0.25 + j as f64);
        let y = Array1::from_shape_fn(n, |i| {
            let v = i as f64 * 0.25;
            v * 2.0 + (v * 0.5).cos()
        });
        (x, y)
    }

    #[test]
    fn test_fits_smooth_target() {
        let (x, y) = training_data();
        let mut model = AdaBoostRegressor::new(20, 1.0).with_random_state(42);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert!(r2_score(&y, &preds) > 0.9);
    }

    #[test]
    fn test_is_seeded() {
        let (x, y) = training_data();

        let mut a = AdaBoostRegressor::new(10, 1.0).with_random_state(3);
        a.fit(&x, &y).unwrap();
        let mut b = AdaBoostRegressor::new(10, 1.0).with_random_state(3);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = AdaBoostRegressor::new(5, 1.0);
        assert!(matches!(
            model.predict(&Array2::zeros((1, 2))).unwrap_err(),
            PipelineError::NotFitted
        ));
    }

    #[test]
    fn test_ensemble_never_empty() {
        // Pure-noise target: every learner's loss is high, but at least
        // one is kept
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(20, |i| if i % 2 == 0 { 1.0 } else { -1.0 });

        let mut model = AdaBoostRegressor::new(10, 1.0).with_random_state(1);
        model.fit(&x, &y).unwrap();
        assert!(!model.learners.is_empty());
        assert!(model.predict(&x).is_ok());
    }
}
