//! Model trainer
//!
//! Takes the transformed train/test matrices (target in the last column),
//! grid-searches every catalog family, refits each family's best candidate
//! on the full training set, and selects the family with the highest
//! held-out R². A winner below the quality floor fails the run before any
//! artifact is written.

use crate::artifact;
use crate::error::{PipelineError, Result};
use super::catalog::ModelCatalog;
use super::grid_search::grid_search;
use super::metrics::r2_score;
use super::regressor::{ModelFamily, Regressor};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Trainer tunables
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub model_path: PathBuf,
    pub cv_folds: usize,
    pub quality_floor: f64,
    pub seed: u64,
}

/// Per-family evaluation result
#[derive(Debug, Clone, Serialize)]
pub struct ModelEvaluation {
    pub family: ModelFamily,
    /// Hyperparameters of the family's best candidate
    pub params: String,
    /// Mean cross-validation R² of that candidate
    pub cv_score: f64,
    pub train_r2: f64,
    pub test_r2: f64,
}

pub struct ModelTrainer {
    config: TrainerConfig,
    catalog: ModelCatalog,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            catalog: ModelCatalog::standard(),
        }
    }

    /// Swap in a custom catalog (narrower grids, injected candidates).
    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Train every catalog family and persist the best model. Returns the
    /// winner's test R².
    pub fn train(&self, train: &Array2<f64>, test: &Array2<f64>) -> Result<f64> {
        let (x_train, y_train) = split_features_target(train)?;
        let (x_test, y_test) = split_features_target(test)?;

        if self.catalog.is_empty() {
            return Err(PipelineError::Training("model catalog is empty".to_string()));
        }

        let mut evaluations = Vec::with_capacity(self.catalog.len());
        let mut fitted = Vec::with_capacity(self.catalog.len());

        for entry in self.catalog.entries() {
            let outcome = grid_search(
                &entry.candidates,
                &x_train,
                &y_train,
                self.config.cv_folds,
                self.config.seed,
            )?;

            let mut model = entry.candidates[outcome.best_index].clone();
            model.fit(&x_train, &y_train)?;

            let train_r2 = r2_score(&y_train, &model.predict(&x_train)?);
            let test_r2 = r2_score(&y_test, &model.predict(&x_test)?);

            info!(
                family = %entry.family,
                params = %model.describe(),
                cv_score = outcome.best_score,
                train_r2,
                test_r2,
                "evaluated model family"
            );

            evaluations.push(ModelEvaluation {
                family: entry.family,
                params: model.describe(),
                cv_score: outcome.best_score,
                train_r2,
                test_r2,
            });
            fitted.push(model);
        }

        let best_idx = select_best(&evaluations)
            .ok_or_else(|| PipelineError::Training("no model was evaluated".to_string()))?;
        let best = &evaluations[best_idx];

        if best.test_r2 < self.config.quality_floor {
            return Err(PipelineError::NoAcceptableModel {
                best_score: best.test_r2,
                floor: self.config.quality_floor,
            });
        }

        artifact::save(&self.config.model_path, &fitted[best_idx])?;
        info!(
            family = %best.family,
            test_r2 = best.test_r2,
            path = %self.config.model_path.display(),
            "saved best model"
        );

        Ok(best.test_r2)
    }
}

/// Index of the evaluation with the maximum test R². Strict comparison
/// keeps the first maximum, so ties resolve to catalog order.
pub fn select_best(evaluations: &[ModelEvaluation]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, eval) in evaluations.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) if eval.test_r2 > evaluations[b].test_r2 => best = Some(i),
            _ => {}
        }
    }
    best
}

/// Split a matrix into features (all but last column) and target (last).
pub fn split_features_target(matrix: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    if matrix.ncols() < 2 {
        return Err(PipelineError::Shape {
            expected: "at least 2 columns (features + target)".to_string(),
            actual: format!("{} columns", matrix.ncols()),
        });
    }
    let n_features = matrix.ncols() - 1;
    let x = matrix.slice(ndarray::s![.., ..n_features]).to_owned();
    let y = matrix.index_axis(Axis(1), n_features).to_owned();
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::catalog::CatalogEntry;
    use crate::training::decision_tree::DecisionTree;
    use crate::training::linear::LinearRegression;
    use ndarray::array;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tempfile::tempdir;

    fn evaluation(family: ModelFamily, test_r2: f64) -> ModelEvaluation {
        ModelEvaluation {
            family,
            params: String::new(),
            cv_score: 0.0,
            train_r2: 0.0,
            test_r2,
        }
    }

    /// Linear target over one feature: trivially learnable.
    fn learnable_matrices() -> (Array2<f64>, Array2<f64>) {
        let make = |offset: usize, n: usize| {
            Array2::from_shape_fn((n, 2), |(i, c)| {
                let v = (offset + i) as f64;
                if c == 0 {
                    v
                } else {
                    2.0 * v + 1.0
                }
            })
        };
        (make(0, 80), make(80, 20))
    }

    /// Pure-noise target: nothing clears the floor.
    fn noise_matrices() -> (Array2<f64>, Array2<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut make = |n: usize| {
            Array2::from_shape_fn((n, 2), |(i, c)| {
                if c == 0 {
                    i as f64
                } else {
                    rng.gen::<f64>() * 100.0
                }
            })
        };
        let train = make(80);
        let test = make(40);
        (train, test)
    }

    fn small_catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            CatalogEntry {
                family: ModelFamily::LinearRegression,
                candidates: vec![Regressor::LinearRegression(LinearRegression::new())],
            },
            CatalogEntry {
                family: ModelFamily::DecisionTree,
                candidates: vec![Regressor::DecisionTree(DecisionTree::new().with_max_depth(4))],
            },
        ])
    }

    #[test]
    fn test_split_features_target() {
        let matrix = array![[1.0, 2.0, 10.0], [3.0, 4.0, 20.0]];
        let (x, y) = split_features_target(&matrix).unwrap();
        assert_eq!(x, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(y, array![10.0, 20.0]);
    }

    #[test]
    fn test_split_needs_two_columns() {
        let matrix = Array2::<f64>::zeros((3, 1));
        assert!(split_features_target(&matrix).is_err());
    }

    #[test]
    fn test_selection_is_monotonic() {
        // Forcing any entry's score above the others makes it the winner,
        // wherever it sits in catalog order
        let families = [
            ModelFamily::RandomForest,
            ModelFamily::DecisionTree,
            ModelFamily::LinearRegression,
        ];
        for winner in 0..families.len() {
            let evals: Vec<ModelEvaluation> = families
                .iter()
                .enumerate()
                .map(|(i, &f)| evaluation(f, if i == winner { 0.99 } else { 0.5 }))
                .collect();
            assert_eq!(select_best(&evals), Some(winner));
        }
    }

    #[test]
    fn test_selection_tie_breaks_to_catalog_order() {
        let evals = vec![
            evaluation(ModelFamily::RandomForest, 0.8),
            evaluation(ModelFamily::DecisionTree, 0.8),
        ];
        assert_eq!(select_best(&evals), Some(0));
    }

    #[test]
    fn test_train_persists_best_model() {
        let dir = tempdir().unwrap();
        let config = TrainerConfig {
            model_path: dir.path().join("model.json"),
            cv_folds: 3,
            quality_floor: 0.6,
            seed: 42,
        };
        let (train, test) = learnable_matrices();

        let score = ModelTrainer::new(config)
            .with_catalog(small_catalog())
            .train(&train, &test)
            .unwrap();

        assert!(score > 0.9);
        let loaded: Regressor = artifact::load(&dir.path().join("model.json")).unwrap();
        assert!(loaded.predict(&Array2::from_elem((1, 1), 5.0)).is_ok());
    }

    #[test]
    fn test_below_floor_writes_nothing() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let config = TrainerConfig {
            model_path: model_path.clone(),
            cv_folds: 3,
            quality_floor: 0.6,
            seed: 42,
        };
        let (train, test) = noise_matrices();

        let err = ModelTrainer::new(config)
            .with_catalog(small_catalog())
            .train(&train, &test)
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoAcceptableModel { .. }));
        assert!(!model_path.exists(), "weak model must not be persisted");
    }
}
