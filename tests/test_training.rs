//! Integration test: every catalog family trains, predicts, and survives
//! a serialization round trip

use ndarray::{Array1, Array2};
use scorecast::training::{
    metrics::r2_score, AdaBoostRegressor, CatBoostConfig, CatBoostRegressor, DecisionTree,
    GradientBoostingConfig, GradientBoostingRegressor, LinearRegression, RandomForest, Regressor,
    XgBoostConfig, XgBoostRegressor,
};

/// Smooth single-trend data every family can learn. Features are kept
/// linearly independent so the OLS normal equations stay well posed.
fn smoke_data() -> (Array2<f64>, Array1<f64>) {
    let n = 80;
    let x = Array2::from_shape_fn((n, 3), |(i, j)| {
        let v = i as f64 * 0.2;
        match j {
            0 => v,
            1 => v * v * 0.05,
            _ => (i % 7) as f64,
        }
    });
    let y = Array1::from_shape_fn(n, |i| {
        let v = i as f64 * 0.2;
        1.5 * v + 4.0
    });
    (x, y)
}

fn all_families() -> Vec<Regressor> {
    vec![
        Regressor::RandomForest(RandomForest::new(15).with_random_state(42)),
        Regressor::DecisionTree(DecisionTree::new().with_max_depth(6)),
        Regressor::GradientBoosting(GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 40,
            ..Default::default()
        })),
        Regressor::LinearRegression(LinearRegression::new()),
        Regressor::XgBoost(XgBoostRegressor::new(XgBoostConfig {
            n_estimators: 40,
            max_depth: 4,
            ..Default::default()
        })),
        Regressor::CatBoost(CatBoostRegressor::new(CatBoostConfig {
            iterations: 40,
            depth: 4,
            ..Default::default()
        })),
        Regressor::AdaBoost(AdaBoostRegressor::new(15, 1.0).with_random_state(42)),
    ]
}

#[test]
fn test_every_family_learns_the_trend() {
    let (x, y) = smoke_data();

    for mut model in all_families() {
        let family = model.family();
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        let r2 = r2_score(&y, &preds);
        assert!(r2 > 0.8, "{family} scored r2 = {r2}");
    }
}

#[test]
fn test_every_family_round_trips_through_json() {
    let (x, y) = smoke_data();

    for mut model in all_families() {
        let family = model.family();
        model.fit(&x, &y).unwrap();
        let expected = model.predict(&x).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: Regressor = serde_json::from_str(&json).unwrap();
        let actual = restored.predict(&x).unwrap();

        assert_eq!(
            expected, actual,
            "{family} predictions changed across the round trip"
        );
    }
}

#[test]
fn test_unfitted_models_refuse_to_predict() {
    let (x, _) = smoke_data();
    for model in all_families() {
        assert!(
            model.predict(&x).is_err(),
            "{} predicted before fit",
            model.family()
        );
    }
}
