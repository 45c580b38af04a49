//! Model training module
//!
//! Native regression model implementations plus the selection machinery:
//! - Linear regression (OLS)
//! - Decision tree (CART)
//! - Random forest
//! - Gradient boosting
//! - XGBoost-style second-order boosting
//! - CatBoost-style symmetric-tree boosting
//! - AdaBoost.R2
//! - K-fold cross-validation, grid search, and the model trainer

pub mod adaboost;
pub mod catalog;
pub mod catboost;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod grid_search;
pub mod linear;
pub mod metrics;
pub mod random_forest;
pub mod regressor;
pub mod trainer;
pub mod xgboost;

pub use adaboost::AdaBoostRegressor;
pub use catalog::{CatalogEntry, ModelCatalog};
pub use catboost::{CatBoostConfig, CatBoostRegressor};
pub use cross_validation::{CvScores, FoldSplit, KFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use grid_search::{grid_search, GridSearchOutcome};
pub use linear::LinearRegression;
pub use metrics::{r2_score, RegressionMetrics};
pub use random_forest::{MaxFeatures, RandomForest};
pub use regressor::{ModelFamily, Regressor};
pub use trainer::{select_best, ModelEvaluation, ModelTrainer, TrainerConfig};
pub use xgboost::{XgBoostConfig, XgBoostRegressor};
