//! Ordered boosting over symmetric (oblivious) trees
//!
//! Every level of a symmetric tree shares one split, so a depth-d tree is
//! d (feature, threshold) pairs plus 2^d leaf values. Subsampling draws
//! from a fixed random permutation to decorrelate rounds.

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatBoostConfig {
    pub iterations: usize,
    pub learning_rate: f64,
    pub depth: usize,
    pub reg_lambda: f64,
    pub subsample: f64,
    pub random_state: Option<u64>,
}

impl Default for CatBoostConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            learning_rate: 0.1,
            depth: 6,
            reg_lambda: 3.0,
            subsample: 1.0,
            random_state: Some(42),
        }
    }
}

/// One split per level, 2^depth leaves
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymmetricTree {
    splits: Vec<(usize, f64)>,
    leaf_values: Vec<f64>,
}

impl SymmetricTree {
    fn predict(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        for &(feature, threshold) in &self.splits {
            idx = idx * 2 + usize::from(sample[feature] > threshold);
        }
        self.leaf_values[idx.min(self.leaf_values.len() - 1)]
    }
}

fn build_symmetric_tree(
    x: &Array2<f64>,
    gradients: &[f64],
    hessians: &[f64],
    indices: &[usize],
    depth: usize,
    reg_lambda: f64,
) -> SymmetricTree {
    let n_features = x.ncols();
    let mut splits = Vec::with_capacity(depth);
    let mut buckets: Vec<Vec<usize>> = vec![indices.to_vec()];

    for _level in 0..depth {
        // One global split per level, best across all current buckets
        let best = (0..n_features)
            .into_par_iter()
            .filter_map(|feat| {
                let mut all_vals: Vec<f64> = buckets
                    .iter()
                    .flat_map(|b| b.iter().map(|&i| x[[i, feat]]))
                    .collect();
                all_vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                all_vals.dedup();
                if all_vals.len() < 2 {
                    return None;
                }

                // Cap the candidate thresholds per feature
                let step = (all_vals.len() / 256).max(1);
                let mut best_gain = f64::NEG_INFINITY;
                let mut best_thr = 0.0;

                for i in (0..all_vals.len() - 1).step_by(step) {
                    let thr = (all_vals[i] + all_vals[i + 1]) / 2.0;
                    let mut total_gain = 0.0;

                    for bucket in &buckets {
                        let (lg, lh, rg, rh) = bucket.iter().fold(
                            (0.0, 0.0, 0.0, 0.0),
                            |(lg, lh, rg, rh), &idx| {
                                if x[[idx, feat]] <= thr {
                                    (lg + gradients[idx], lh + hessians[idx], rg, rh)
                                } else {
                                    (lg, lh, rg + gradients[idx], rh + hessians[idx])
                                }
                            },
                        );
                        let parent_g = lg + rg;
                        let parent_h = lh + rh;
                        total_gain += lg * lg / (lh + reg_lambda) + rg * rg / (rh + reg_lambda)
                            - parent_g * parent_g / (parent_h + reg_lambda);
                    }

                    if total_gain > best_gain {
                        best_gain = total_gain;
                        best_thr = thr;
                    }
                }

                if best_gain > 0.0 {
                    Some((feat, best_thr, best_gain))
                } else {
                    None
                }
            })
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feat, thr, _)) => {
                splits.push((feat, thr));
                let mut new_buckets = Vec::with_capacity(buckets.len() * 2);
                for bucket in &buckets {
                    let (left, right): (Vec<usize>, Vec<usize>) =
                        bucket.iter().partition(|&&i| x[[i, feat]] <= thr);
                    new_buckets.push(left);
                    new_buckets.push(right);
                }
                buckets = new_buckets;
            }
            None => break,
        }
    }

    let leaf_values: Vec<f64> = buckets
        .iter()
        .map(|bucket| {
            if bucket.is_empty() {
                return 0.0;
            }
            let g: f64 = bucket.iter().map(|&i| gradients[i]).sum();
            let h: f64 = bucket.iter().map(|&i| hessians[i]).sum();
            -g / (h + reg_lambda)
        })
        .collect();

    SymmetricTree {
        splits,
        leaf_values,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatBoostRegressor {
    pub config: CatBoostConfig,
    trees: Vec<SymmetricTree>,
    base_prediction: f64,
}

impl CatBoostRegressor {
    pub fn new(config: CatBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_prediction: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(PipelineError::Training("empty training set".to_string()));
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state.unwrap_or(42));
        self.base_prediction = y.mean().unwrap_or(0.0);
        let mut predictions = Array1::from_elem(n, self.base_prediction);

        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(&mut rng);

        self.trees.clear();

        for _ in 0..self.config.iterations {
            let gradients: Vec<f64> = predictions
                .iter()
                .zip(y.iter())
                .map(|(&p, &yi)| p - yi)
                .collect();
            let hessians: Vec<f64> = vec![1.0; n];

            let indices: Vec<usize> = if self.config.subsample < 1.0 {
                let k = ((n as f64) * self.config.subsample).ceil() as usize;
                let mut sub = perm.clone();
                sub.shuffle(&mut rng);
                sub.truncate(k);
                sub
            } else {
                (0..n).collect()
            };

            let tree = build_symmetric_tree(
                x,
                &gradients,
                &hessians,
                &indices,
                self.config.depth,
                self.config.reg_lambda,
            );

            for i in 0..n {
                predictions[i] +=
                    self.config.learning_rate * tree.predict(x.row(i).as_slice().unwrap());
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted);
        }

        Ok(Array1::from_vec(
            x.rows()
                .into_iter()
                .map(|row| {
                    let sample = row.as_slice().unwrap();
                    self.base_prediction
                        + self
                            .trees
                            .iter()
                            .map(|t| self.config.learning_rate * t.predict(sample))
                            .sum::<f64>()
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::r2_score;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((100, 3), |(i, j)| (i * 3 + j) as f64 / 100.0);
        let y = Array1::from_shape_fn(100, |i| 2.0 * (i * 3) as f64 / 100.0 + 0.1);
        (x, y)
    }

    #[test]
    fn test_regressor_learns() {
        let (x, y) = training_data();
        let config = CatBoostConfig {
            iterations: 30,
            depth: 4,
            ..Default::default()
        };
        let mut model = CatBoostRegressor::new(config);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert!(r2_score(&y, &preds) > 0.9);
    }

    #[test]
    fn test_symmetric_tree_shape() {
        let (x, y) = training_data();
        let config = CatBoostConfig {
            iterations: 5,
            depth: 3,
            ..Default::default()
        };
        let mut model = CatBoostRegressor::new(config);
        model.fit(&x, &y).unwrap();

        for tree in &model.trees {
            assert!(tree.splits.len() <= 3);
            assert!(tree.leaf_values.len() <= 8);
        }
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = CatBoostRegressor::new(CatBoostConfig::default());
        assert!(model.predict(&Array2::zeros((1, 3))).is_err());
    }
}
