//! Cross-validated grid search over a candidate list

use crate::error::{PipelineError, Result};
use super::cross_validation::KFold;
use super::metrics::r2_score;
use super::regressor::Regressor;
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

/// Outcome of one grid search
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    /// Index of the winning candidate
    pub best_index: usize,
    /// Its mean cross-validation R²
    pub best_score: f64,
    /// Mean CV R² per candidate, in candidate order
    pub candidate_scores: Vec<f64>,
}

/// Score every candidate by mean R² over k shuffled folds and pick the
/// maximum. Candidates tie-break to the earlier index, so grid order is
/// the deterministic tie-break.
pub fn grid_search(
    candidates: &[Regressor],
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
    seed: u64,
) -> Result<GridSearchOutcome> {
    if candidates.is_empty() {
        return Err(PipelineError::Training(
            "grid search over an empty candidate list".to_string(),
        ));
    }

    let splits = KFold::new(folds)
        .with_shuffle(true)
        .with_seed(seed)
        .split(x.nrows())?;

    let candidate_scores: Vec<f64> = candidates
        .par_iter()
        .map(|candidate| -> Result<f64> {
            let mut fold_scores = Vec::with_capacity(splits.len());
            for split in &splits {
                let x_train = x.select(Axis(0), &split.train_indices);
                let y_train: Array1<f64> =
                    Array1::from_vec(split.train_indices.iter().map(|&i| y[i]).collect());
                let x_val = x.select(Axis(0), &split.validation_indices);
                let y_val: Array1<f64> =
                    Array1::from_vec(split.validation_indices.iter().map(|&i| y[i]).collect());

                let mut model = candidate.clone();
                model.fit(&x_train, &y_train)?;
                fold_scores.push(r2_score(&y_val, &model.predict(&x_val)?));
            }
            Ok(fold_scores.iter().sum::<f64>() / fold_scores.len() as f64)
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut best_index = 0;
    for (i, &score) in candidate_scores.iter().enumerate() {
        if score > candidate_scores[best_index] {
            best_index = i;
        }
    }

    Ok(GridSearchOutcome {
        best_index,
        best_score: candidate_scores[best_index],
        candidate_scores,
    })
}
