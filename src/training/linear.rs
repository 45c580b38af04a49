//! Ordinary least squares linear regression

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system Ax = b with a Cholesky
/// decomposition. Retries once with a small ridge on the diagonal when the
/// matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    match try_cholesky(a, b) {
        Some(x) => Some(x),
        None => {
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            let mut a_reg = a.clone();
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            try_cholesky(&a_reg, b)
        }
    }
}

fn try_cholesky(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                // Near-zero pivots count as rank deficiency (collinear
                // one-hot blocks produce them), not as a valid factor
                let tol = 1e-10 * a[[i, i]].abs().max(1e-12);
                if diag <= tol {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan inverse, the fallback when Cholesky fails outright.
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

/// Linear regression fit by normal equations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    pub fit_intercept: bool,
    is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
            is_fitted: false,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
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

        let (x_centered, y_centered, x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).unwrap();
            let y_mean = y.mean().unwrap_or(0.0);
            let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
            let y_centered = y - y_mean;
            (x_centered, y_centered, Some(x_mean), y_mean)
        } else {
            (x.clone(), y.clone(), None, 0.0)
        };

        let xtx = x_centered.t().dot(&x_centered);
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = match cholesky_solve(&xtx, &xty) {
            Some(coef) => coef,
            None => match matrix_inverse(&xtx) {
                Some(inv) => inv.dot(&xty),
                None => {
                    return Err(PipelineError::Computation(
                        "normal equations are singular".to_string(),
                    ));
                }
            },
        };

        self.intercept = match x_mean {
            Some(x_mean) => y_mean - coefficients.dot(&x_mean),
            None => 0.0,
        };
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(PipelineError::NotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::r2_score;
    use ndarray::array;

    #[test]
    fn test_fits_exact_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0]; // y = 2x + 1

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();

        for (p, t) in preds.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8);
        }
    }

    #[test]
    fn test_two_features() {
        let x = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0]
        ];
        let y = x.column(0).to_owned() * 3.0 + x.column(1).to_owned() * (-2.0) + 0.5;

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert!(r2_score(&y, &preds) > 0.999);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LinearRegression::new();
        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted));
    }

    #[test]
    fn test_no_intercept() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new().with_fit_intercept(false);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert!((preds[0] - 2.0).abs() < 1e-8);
    }
}
