//! RBF-kernel support vector classifier trained with SMO using
//! maximal-violating-pair working set selection.

use crate::domain::ports::Classifier;
use crate::utils::error::{AppError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

const TAU: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct SvcParams {
    pub c: f64,
    /// `None` means 1 / (n_features * Var(X)).
    pub gamma: Option<f64>,
    pub tolerance: f64,
    pub max_iter: Option<usize>,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            gamma: None,
            tolerance: 1e-3,
            max_iter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportVectorClassifier {
    support_vectors: Array2<f64>,
    /// alpha_i * y_i per support vector.
    dual_coef: Array1<f64>,
    rho: f64,
    gamma: f64,
}

fn rbf(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, gamma: f64) -> f64 {
    let dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * dist).exp()
}

pub fn scale_gamma(x: ArrayView2<'_, f64>) -> f64 {
    let var = x.var(0.0);
    if var > 0.0 {
        1.0 / (x.ncols() as f64 * var)
    } else {
        1.0
    }
}

impl SupportVectorClassifier {
    pub fn fit(x: ArrayView2<'_, f64>, labels: ArrayView1<'_, f64>, params: SvcParams) -> Result<Self> {
        let n = x.nrows();
        if n == 0 || n != labels.len() {
            return Err(AppError::TrainingError {
                message: format!("SVC needs matching rows, got {} x / {} y", n, labels.len()),
            });
        }

        let y: Vec<f64> = labels.iter().map(|&v| if v > 0.5 { 1.0 } else { -1.0 }).collect();
        if y.iter().all(|&v| v == y[0]) {
            return Err(AppError::TrainingError {
                message: "SVC needs both classes in the training data".to_string(),
            });
        }

        let gamma = params.gamma.unwrap_or_else(|| scale_gamma(x));
        let c = params.c;

        let mut kernel = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let k = rbf(x.row(i), x.row(j), gamma);
                kernel[[i, j]] = k;
                kernel[[j, i]] = k;
            }
        }
        let q = |i: usize, j: usize| y[i] * y[j] * kernel[[i, j]];

        let mut alpha = vec![0.0; n];
        let mut grad = vec![-1.0; n];
        let max_iter = params.max_iter.unwrap_or_else(|| (100 * n).max(100_000));

        let mut iterations = 0;
        while iterations < max_iter {
            // 選出違反 KKT 最嚴重的一對
            let mut g_max = f64::NEG_INFINITY;
            let mut g_min = f64::INFINITY;
            let mut pick_i = None;
            let mut pick_j = None;
            for t in 0..n {
                let score = -y[t] * grad[t];
                let in_up = (y[t] > 0.0 && alpha[t] < c) || (y[t] < 0.0 && alpha[t] > 0.0);
                let in_low = (y[t] > 0.0 && alpha[t] > 0.0) || (y[t] < 0.0 && alpha[t] < c);
                if in_up && score >= g_max {
                    g_max = score;
                    pick_i = Some(t);
                }
                if in_low && score <= g_min {
                    g_min = score;
                    pick_j = Some(t);
                }
            }

            let (i, j) = match (pick_i, pick_j) {
                (Some(i), Some(j)) if g_max - g_min >= params.tolerance && i != j => (i, j),
                _ => break,
            };

            let (old_ai, old_aj) = (alpha[i], alpha[j]);
            if y[i] != y[j] {
                let quad = (q(i, i) + q(j, j) + 2.0 * q(i, j)).max(TAU);
                let delta = (-grad[i] - grad[j]) / quad;
                let diff = alpha[i] - alpha[j];
                alpha[i] += delta;
                alpha[j] += delta;
                if diff > 0.0 {
                    if alpha[j] < 0.0 {
                        alpha[j] = 0.0;
                        alpha[i] = diff;
                    }
                } else if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                if diff > 0.0 {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = c - diff;
                    }
                } else if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = c + diff;
                }
            } else {
                let quad = (q(i, i) + q(j, j) - 2.0 * q(i, j)).max(TAU);
                let delta = (grad[i] - grad[j]) / quad;
                let sum = alpha[i] + alpha[j];
                alpha[i] -= delta;
                alpha[j] += delta;
                if sum > c {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = sum - c;
                    }
                } else if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = sum;
                }
                if sum > c {
                    if alpha[j] > c {
                        alpha[j] = c;
                        alpha[i] = sum - c;
                    }
                } else if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = sum;
                }
            }

            let (d_ai, d_aj) = (alpha[i] - old_ai, alpha[j] - old_aj);
            for (k, g) in grad.iter_mut().enumerate() {
                *g += q(i, k) * d_ai + q(j, k) * d_aj;
            }
            iterations += 1;
        }

        if iterations == max_iter {
            tracing::warn!("SVC stopped at the iteration limit ({})", max_iter);
        } else {
            tracing::debug!("SVC converged after {} iterations", iterations);
        }

        let rho = compute_rho(&alpha, &grad, &y, c);

        let support: Vec<usize> = (0..n).filter(|&i| alpha[i] > 0.0).collect();
        let support_vectors = x.select(Axis(0), &support);
        let dual_coef: Array1<f64> = support.iter().map(|&i| alpha[i] * y[i]).collect();

        Ok(Self {
            support_vectors,
            dual_coef,
            rho,
            gamma,
        })
    }

    pub fn decision_function(&self, row: ArrayView1<'_, f64>) -> f64 {
        let sum: f64 = self
            .support_vectors
            .rows()
            .into_iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, coef)| coef * rbf(sv, row, self.gamma))
            .sum();
        sum - self.rho
    }

    pub fn check_shape(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.support_vectors.ncols() != n_features {
            return Err(format!(
                "support vectors have {} columns, expected {}",
                self.support_vectors.ncols(),
                n_features
            ));
        }
        if self.dual_coef.len() != self.support_vectors.nrows() {
            return Err(format!(
                "{} dual coefficients for {} support vectors",
                self.dual_coef.len(),
                self.support_vectors.nrows()
            ));
        }
        Ok(())
    }

    pub fn support_vector_count(&self) -> usize {
        self.dual_coef.len()
    }
}

fn compute_rho(alpha: &[f64], grad: &[f64], y: &[f64], c: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;

    for i in 0..alpha.len() {
        let yg = y[i] * grad[i];
        if alpha[i] >= c {
            if y[i] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[i] <= 0.0 {
            if y[i] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free_count += 1;
            free_sum += yg;
        }
    }

    if free_count > 0 {
        free_sum / free_count as f64
    } else {
        (upper + lower) / 2.0
    }
}

impl Classifier for SupportVectorClassifier {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool {
        self.decision_function(row) > 0.0
    }
}
