//! The model catalog and its hyperparameter grids

use super::adaboost::AdaBoostRegressor;
use super::catboost::{CatBoostConfig, CatBoostRegressor};
use super::decision_tree::{Criterion, DecisionTree};
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::linear::LinearRegression;
use super::random_forest::RandomForest;
use super::regressor::{ModelFamily, Regressor};
use super::xgboost::{XgBoostConfig, XgBoostRegressor};

/// One catalog entry: a family plus its expanded hyperparameter grid.
/// An entry with a single candidate means "library defaults".
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub family: ModelFamily,
    pub candidates: Vec<Regressor>,
}

/// The set of model families compared in one training run. Entry order is
/// fixed and doubles as the selection tie-break order.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The full seven-family catalog with the standard grids.
    pub fn standard() -> Self {
        Self::new(vec![
            CatalogEntry {
                family: ModelFamily::RandomForest,
                candidates: forest_grid(),
            },
            CatalogEntry {
                family: ModelFamily::DecisionTree,
                candidates: tree_grid(),
            },
            CatalogEntry {
                family: ModelFamily::GradientBoosting,
                candidates: gradient_boosting_grid(),
            },
            CatalogEntry {
                family: ModelFamily::LinearRegression,
                candidates: vec![Regressor::LinearRegression(LinearRegression::new())],
            },
            CatalogEntry {
                family: ModelFamily::XgBoost,
                candidates: xgboost_grid(),
            },
            CatalogEntry {
                family: ModelFamily::CatBoost,
                candidates: catboost_grid(),
            },
            CatalogEntry {
                family: ModelFamily::AdaBoost,
                candidates: adaboost_grid(),
            },
        ])
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn forest_grid() -> Vec<Regressor> {
    [8, 16, 32, 64, 128, 256]
        .into_iter()
        .map(|n| Regressor::RandomForest(RandomForest::new(n).with_random_state(42)))
        .collect()
}

fn tree_grid() -> Vec<Regressor> {
    [Criterion::SquaredError, Criterion::AbsoluteError]
        .into_iter()
        .map(|criterion| Regressor::DecisionTree(DecisionTree::new().with_criterion(criterion)))
        .collect()
}

fn gradient_boosting_grid() -> Vec<Regressor> {
    let mut grid = Vec::new();
    for learning_rate in [0.1, 0.05, 0.01] {
        for subsample in [0.6, 0.75, 0.9] {
            for n_estimators in [16, 32, 64] {
                grid.push(Regressor::GradientBoosting(GradientBoostingRegressor::new(
                    GradientBoostingConfig {
                        n_estimators,
                        learning_rate,
                        subsample,
                        ..Default::default()
                    },
                )));
            }
        }
    }
    grid
}

fn xgboost_grid() -> Vec<Regressor> {
    let mut grid = Vec::new();
    for learning_rate in [0.1, 0.05, 0.01] {
        for n_estimators in [16, 32, 64] {
            grid.push(Regressor::XgBoost(XgBoostRegressor::new(XgBoostConfig {
                n_estimators,
                learning_rate,
                max_depth: 4,
                ..Default::default()
            })));
        }
    }
    grid
}

fn catboost_grid() -> Vec<Regressor> {
    let mut grid = Vec::new();
    for depth in [4, 6, 8] {
        for learning_rate in [0.01, 0.05, 0.1] {
            for iterations in [30, 50, 100] {
                grid.push(Regressor::CatBoost(CatBoostRegressor::new(CatBoostConfig {
                    iterations,
                    learning_rate,
                    depth,
                    ..Default::default()
                })));
            }
        }
    }
    grid
}

fn adaboost_grid() -> Vec<Regressor> {
    let mut grid = Vec::new();
    for learning_rate in [0.1, 0.5, 1.0] {
        for n_estimators in [8, 16, 32] {
            grid.push(Regressor::AdaBoost(
                AdaBoostRegressor::new(n_estimators, learning_rate).with_random_state(42),
            ));
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = ModelCatalog::standard();
        let families: Vec<ModelFamily> = catalog.entries().iter().map(|e| e.family).collect();
        assert_eq!(
            families,
            vec![
                ModelFamily::RandomForest,
                ModelFamily::DecisionTree,
                ModelFamily::GradientBoosting,
                ModelFamily::LinearRegression,
                ModelFamily::XgBoost,
                ModelFamily::CatBoost,
                ModelFamily::AdaBoost,
            ]
        );
    }

    #[test]
    fn test_every_entry_has_candidates() {
        for entry in ModelCatalog::standard().entries() {
            assert!(
                !entry.candidates.is_empty(),
                "{} has an empty grid",
                entry.family
            );
            for candidate in &entry.candidates {
                assert_eq!(candidate.family(), entry.family);
            }
        }
    }

    #[test]
    fn test_grid_sizes() {
        let catalog = ModelCatalog::standard();
        let sizes: Vec<usize> = catalog
            .entries()
            .iter()
            .map(|e| e.candidates.len())
            .collect();
        assert_eq!(sizes, vec![6, 2, 27, 1, 9, 27, 9]);
    }
}
