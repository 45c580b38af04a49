//! The closed model catalog types
//!
//! One enum variant per model family keeps the catalog statically checked:
//! adding a family means adding a variant, and every match over
//! [`Regressor`] is exhaustive.

use crate::error::Result;
use super::adaboost::AdaBoostRegressor;
use super::catboost::CatBoostRegressor;
use super::decision_tree::DecisionTree;
use super::gradient_boosting::GradientBoostingRegressor;
use super::linear::LinearRegression;
use super::random_forest::RandomForest;
use super::xgboost::XgBoostRegressor;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Model families in the catalog. The declaration order here is the
/// documented selection tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    RandomForest,
    DecisionTree,
    GradientBoosting,
    LinearRegression,
    XgBoost,
    CatBoost,
    AdaBoost,
}

impl ModelFamily {
    pub fn name(self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "Random Forest",
            ModelFamily::DecisionTree => "Decision Tree",
            ModelFamily::GradientBoosting => "Gradient Boosting",
            ModelFamily::LinearRegression => "Linear Regression",
            ModelFamily::XgBoost => "XGBoost",
            ModelFamily::CatBoost => "CatBoost",
            ModelFamily::AdaBoost => "AdaBoost",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A trainable regressor of any catalog family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
    GradientBoosting(GradientBoostingRegressor),
    LinearRegression(LinearRegression),
    XgBoost(XgBoostRegressor),
    CatBoost(CatBoostRegressor),
    AdaBoost(AdaBoostRegressor),
}

impl Regressor {
    pub fn family(&self) -> ModelFamily {
        match self {
            Regressor::RandomForest(_) => ModelFamily::RandomForest,
            Regressor::DecisionTree(_) => ModelFamily::DecisionTree,
            Regressor::GradientBoosting(_) => ModelFamily::GradientBoosting,
            Regressor::LinearRegression(_) => ModelFamily::LinearRegression,
            Regressor::XgBoost(_) => ModelFamily::XgBoost,
            Regressor::CatBoost(_) => ModelFamily::CatBoost,
            Regressor::AdaBoost(_) => ModelFamily::AdaBoost,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Regressor::RandomForest(m) => m.fit(x, y).map(|_| ()),
            Regressor::DecisionTree(m) => m.fit(x, y).map(|_| ()),
            Regressor::GradientBoosting(m) => m.fit(x, y),
            Regressor::LinearRegression(m) => m.fit(x, y).map(|_| ()),
            Regressor::XgBoost(m) => m.fit(x, y),
            Regressor::CatBoost(m) => m.fit(x, y),
            Regressor::AdaBoost(m) => m.fit(x, y).map(|_| ()),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Regressor::RandomForest(m) => m.predict(x),
            Regressor::DecisionTree(m) => m.predict(x),
            Regressor::GradientBoosting(m) => m.predict(x),
            Regressor::LinearRegression(m) => m.predict(x),
            Regressor::XgBoost(m) => m.predict(x),
            Regressor::CatBoost(m) => m.predict(x),
            Regressor::AdaBoost(m) => m.predict(x),
        }
    }

    /// Short hyperparameter summary for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Regressor::RandomForest(m) => format!("n_estimators={}", m.n_estimators),
            Regressor::DecisionTree(m) => format!("criterion={:?}", m.criterion),
            Regressor::GradientBoosting(m) => format!(
                "learning_rate={}, subsample={}, n_estimators={}",
                m.config.learning_rate, m.config.subsample, m.config.n_estimators
            ),
            Regressor::LinearRegression(_) => "defaults".to_string(),
            Regressor::XgBoost(m) => format!(
                "learning_rate={}, n_estimators={}",
                m.config.learning_rate, m.config.n_estimators
            ),
            Regressor::CatBoost(m) => format!(
                "depth={}, learning_rate={}, iterations={}",
                m.config.depth, m.config.learning_rate, m.config.iterations
            ),
            Regressor::AdaBoost(m) => format!(
                "learning_rate={}, n_estimators={}",
                m.learning_rate, m.n_estimators
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_enum_dispatch_round_trip() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = Regressor::LinearRegression(LinearRegression::new());
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert!((preds[1] - 4.0).abs() < 1e-8);
        assert_eq!(model.family(), ModelFamily::LinearRegression);
    }

    #[test]
    fn test_family_names() {
        assert_eq!(ModelFamily::XgBoost.name(), "XGBoost");
        assert_eq!(ModelFamily::RandomForest.to_string(), "Random Forest");
    }
}
