//! L2-regularized linear regression
//!
//! The intercept is not penalized: features and targets are centered, the
//! normal equations `(XᵀX + αI) w = Xᵀy` are solved for the weights, and the
//! intercept is recovered from the means.

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Pivot magnitude below which the normal equations are treated as singular
const SINGULAR_EPS: f64 = 1e-12;

/// Ridge estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    alpha: f64,
}

/// Fitted ridge weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRidge {
    coef: Vec<f64>,
    intercept: f64,
}

impl Ridge {
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(PredictorError::InvalidInput(format!(
                "alpha must be a finite non-negative number, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<FittedRidge> {
        let n = x.nrows();
        if n == 0 {
            return Err(PredictorError::InvalidInput(
                "cannot fit ridge on zero samples".to_string(),
            ));
        }
        if y.len() != n {
            return Err(PredictorError::InvalidInput(format!(
                "design matrix has {} rows but {} targets were given",
                n,
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(PredictorError::InvalidInput(
                "targets contain missing or non-finite values".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PredictorError::InvalidInput(
                "features contain missing or non-finite values".to_string(),
            ));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictorError::Fit("empty design matrix".to_string()))?;
        let y_mean = y.sum() / n as f64;

        let xc = &x - &x_mean;
        let yc = &y - y_mean;

        let p = x.ncols();
        let gram = xc.t().dot(&xc) + Array2::<f64>::eye(p) * self.alpha;
        let rhs = xc.t().dot(&yc);

        let coef = solve_linear_system(gram, rhs)?;
        let intercept = y_mean - x_mean.dot(&coef);

        Ok(FittedRidge {
            coef: coef.to_vec(),
            intercept,
        })
    }
}

impl FittedRidge {
    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coef.len() {
            return Err(PredictorError::SchemaMismatch(format!(
                "expected {} features, got {}",
                self.coef.len(),
                x.ncols()
            )));
        }
        let coef = ArrayView1::from(self.coef.as_slice());
        Ok(x.dot(&coef) + self.intercept)
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting
fn solve_linear_system(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();

    for k in 0..n {
        let pivot = (k..n)
            .max_by(|&i, &j| {
                a[[i, k]]
                    .abs()
                    .partial_cmp(&a[[j, k]].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(k);

        if a[[pivot, k]].abs() < SINGULAR_EPS {
            return Err(PredictorError::Fit(
                "normal equations are singular; increase alpha or remove collinear features"
                    .to_string(),
            ));
        }

        if pivot != k {
            for j in 0..n {
                a.swap([k, j], [pivot, j]);
            }
            b.swap(k, pivot);
        }

        for i in (k + 1)..n {
            let factor = a[[i, k]] / a[[k, k]];
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                a[[i, j]] -= factor * a[[k, j]];
            }
            b[i] -= factor * b[k];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[[i, j]] * x[j]).sum();
        x[i] = (b[i] - tail) / a[[i, i]];
    }
    Ok(x)
}
