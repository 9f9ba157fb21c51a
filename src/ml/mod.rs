//! Classifiers, preprocessing and the persisted model artifact.

pub mod logistic;
pub mod preprocessing;
pub mod svc;
pub mod tree;

use crate::domain::model::{ModelCode, FEATURE_COUNT};
use crate::domain::ports::Classifier;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

pub use logistic::{LogisticParams, LogisticRegression};
pub use preprocessing::{PreparedDataset, Preprocessor};
pub use svc::{SupportVectorClassifier, SvcParams};
pub use tree::{DecisionTree, TreeParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum TrainedClassifier {
    DecisionTree(DecisionTree),
    SupportVector(SupportVectorClassifier),
    LogisticRegression(LogisticRegression),
}

impl TrainedClassifier {
    /// Fits the classifier a model code stands for, with its fixed hyperparameters.
    pub fn fit(code: ModelCode, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<Self> {
        Ok(match code {
            ModelCode::Dt => Self::DecisionTree(DecisionTree::fit(x, y, TreeParams::default())?),
            ModelCode::Svc => {
                Self::SupportVector(SupportVectorClassifier::fit(x, y, SvcParams::default())?)
            }
            ModelCode::Lr => {
                Self::LogisticRegression(LogisticRegression::fit(x, y, LogisticParams::default())?)
            }
        })
    }
}

impl TrainedClassifier {
    fn check_shape(&self, n_features: usize) -> std::result::Result<(), String> {
        match self {
            Self::DecisionTree(m) => m.check_shape(n_features),
            Self::SupportVector(m) => m.check_shape(n_features),
            Self::LogisticRegression(m) => m.check_shape(n_features),
        }
    }
}

impl Classifier for TrainedClassifier {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool {
        match self {
            Self::DecisionTree(m) => m.predict_row(row),
            Self::SupportVector(m) => m.predict_row(row),
            Self::LogisticRegression(m) => m.predict_row(row),
        }
    }
}

/// Everything written to `model_<code>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub code: ModelCode,
    pub classifier: TrainedClassifier,
    pub preprocessor: Preprocessor,
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn accuracy_label(&self) -> String {
        format!("{:.2}%", self.accuracy * 100.0)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses and validates a model file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }
}

/// Serving indexes the stored arrays directly, so a file that parses but has
/// the wrong shape is rejected as corrupt.
impl Validate for TrainedModel {
    fn validate(&self) -> Result<()> {
        self.preprocessor
            .scaler
            .check_shape(FEATURE_COUNT)
            .and_then(|()| self.classifier.check_shape(FEATURE_COUNT))
            .map_err(|reason| {
                AppError::SerializationError(<serde_json::Error as serde::de::Error>::custom(
                    format!("{} model: {}", self.code, reason),
                ))
            })
    }
}

pub fn accuracy_score(y_true: ArrayView1<'_, f64>, y_pred: &[bool]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(AppError::TrainingError {
            message: format!(
                "accuracy needs equal lengths, got {} labels and {} predictions",
                y_true.len(),
                y_pred.len()
            ),
        });
    }
    if y_pred.is_empty() {
        return Ok(0.0);
    }

    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|&(&truth, &pred)| (truth > 0.5) == pred)
        .count();
    Ok(correct as f64 / y_pred.len() as f64)
}
