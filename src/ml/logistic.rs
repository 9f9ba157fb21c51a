use crate::domain::ports::Classifier;
use crate::utils::error::{AppError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// L2-regularised logistic regression fitted by batch gradient descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    intercept: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct LogisticParams {
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.5,
            tolerance: 1e-6,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    pub fn fit(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>, params: LogisticParams) -> Result<Self> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(AppError::TrainingError {
                message: format!("logistic regression needs matching rows, got {} x / {} y", n, y.len()),
            });
        }

        let n_f = n as f64;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;

        for iter in 0..params.max_iter {
            let z = x.dot(&weights) + intercept;
            let residual = z.mapv(sigmoid) - &y;

            // 目標函數：平均 log loss + ||w||² / (2 C n)
            let grad_w = x.t().dot(&residual) / n_f + &weights / (params.c * n_f);
            let grad_b = residual.sum() / n_f;

            weights.scaled_add(-params.learning_rate, &grad_w);
            intercept -= params.learning_rate * grad_b;

            let norm = grad_w.dot(&grad_w) + grad_b * grad_b;
            if norm.sqrt() < params.tolerance {
                tracing::debug!("Logistic regression converged after {} iterations", iter + 1);
                break;
            }
        }

        Ok(Self { weights, intercept })
    }

    pub fn check_shape(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.weights.len() != n_features {
            return Err(format!(
                "{} weights, expected {}",
                self.weights.len(),
                n_features
            ));
        }
        Ok(())
    }

    pub fn probability(&self, row: ArrayView1<'_, f64>) -> f64 {
        sigmoid(row.dot(&self.weights) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool {
        self.probability(row) > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_learns_separable_points() {
        let x = array![[0.0, 0.1], [0.05, 0.0], [0.1, 0.05], [0.9, 1.0], [0.95, 0.9], [1.0, 0.95]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let model = LogisticRegression::fit(x.view(), y.view(), LogisticParams::default()).unwrap();

        assert_eq!(model.predict(x.view()), vec![false, false, false, true, true, true]);
        assert!(model.probability(array![1.0, 1.0].view()) > model.probability(array![0.0, 0.0].view()));
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0];
        assert!(LogisticRegression::fit(x.view(), y.view(), LogisticParams::default()).is_err());
    }
}
