//! K-fold cross-validation splitting

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/validation split
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub validation_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter. Folds are disjoint and cover every index exactly once;
/// fold sizes differ by at most one.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the folds for `n_samples` rows.
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(PipelineError::Training(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(PipelineError::Training(format!(
                "n_samples ({n_samples}) must be >= n_splits ({})",
                self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        // Spread the remainder over the first folds
        let fold_sizes: Vec<usize> = (0..self.n_splits)
            .map(|i| {
                let base = n_samples / self.n_splits;
                let remainder = n_samples % self.n_splits;
                if i < remainder {
                    base + 1
                } else {
                    base
                }
            })
            .collect();

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for (fold_idx, &fold_size) in fold_sizes.iter().enumerate() {
            let validation_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                validation_indices,
                fold_idx,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Summary of per-fold scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            scores,
            mean,
            std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_coverage() {
        let splits = KFold::new(5).split(100).unwrap();
        assert_eq!(splits.len(), 5);

        for split in &splits {
            assert_eq!(split.validation_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        // Every index appears in exactly one validation fold
        let mut all: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.validation_indices.clone())
            .collect();
        all.sort();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_uneven_sizes() {
        let splits = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.validation_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_shuffled_split_is_seeded() {
        let a = KFold::new(3).with_shuffle(true).with_seed(7).split(30).unwrap();
        let b = KFold::new(3).with_shuffle(true).with_seed(7).split(30).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.validation_indices, y.validation_indices);
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert!(KFold::new(5).split(3).is_err());
        assert!(KFold::new(1).split(10).is_err());
    }

    #[test]
    fn test_cv_scores_summary() {
        let cv = CvScores::from_scores(vec![0.8, 0.9, 1.0]);
        assert!((cv.mean - 0.9).abs() < 1e-12);
        assert!(cv.std > 0.0);
    }
}
