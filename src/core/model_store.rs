use crate::domain::model::ModelCode;
use crate::domain::ports::Storage;
use crate::ml::TrainedModel;
use crate::utils::error::{AppError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lookup-table path for a model code; unknown codes get the logistic
/// regression file.
pub fn model_path(model_dir: &Path, code: &str) -> PathBuf {
    model_dir.join(ModelCode::resolve(code).file_name())
}

/// Reads and writes serialized models through a [`Storage`].
pub struct ModelStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ModelStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn is_available(&self, code: ModelCode) -> bool {
        self.storage.exists(&code.file_name())
    }

    pub async fn load(&self, code: ModelCode) -> Result<TrainedModel> {
        let file_name = code.file_name();
        if !self.storage.exists(&file_name) {
            return Err(AppError::ModelNotFound {
                code: code.to_string(),
                path: file_name,
            });
        }

        let bytes = self.storage.read_file(&file_name).await?;
        let model = TrainedModel::from_bytes(&bytes)?;
        if model.code != code {
            return Err(AppError::TrainingError {
                message: format!("{} holds a '{}' model, expected '{}'", file_name, model.code, code),
            });
        }
        Ok(model)
    }

    pub async fn save(&self, model: &TrainedModel) -> Result<String> {
        let file_name = model.code.file_name();
        self.storage.write_file(&file_name, &model.to_bytes()?).await?;
        Ok(file_name)
    }

    /// Loads every code whose file is present. Missing or unreadable files
    /// are logged and left out.
    pub async fn load_all(&self) -> ModelRegistry {
        let mut models = HashMap::new();
        for code in ModelCode::ALL {
            match self.load(code).await {
                Ok(model) => {
                    tracing::info!(
                        "🧠 Loaded {} model (accuracy {})",
                        code.display_name(),
                        model.accuracy_label()
                    );
                    models.insert(code, Arc::new(model));
                }
                Err(AppError::ModelNotFound { path, .. }) => {
                    tracing::warn!("Model '{}' not found ({}), it will be unavailable", code, path);
                }
                Err(e) => {
                    tracing::error!("❌ Failed to load model '{}': {}", code, e);
                }
            }
        }
        ModelRegistry { models }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub code: ModelCode,
    pub name: &'static str,
    pub available: bool,
    pub accuracy: Option<String>,
    pub trained_at: Option<String>,
}

/// Read-only set of models loaded at start-up.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<ModelCode, Arc<TrainedModel>>,
}

impl ModelRegistry {
    pub fn get(&self, code: ModelCode) -> Result<Arc<TrainedModel>> {
        self.models
            .get(&code)
            .cloned()
            .ok_or_else(|| AppError::ModelNotFound {
                code: code.to_string(),
                path: code.file_name(),
            })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn summaries(&self) -> Vec<ModelSummary> {
        ModelCode::ALL
            .iter()
            .map(|&code| {
                let model = self.models.get(&code);
                ModelSummary {
                    code,
                    name: code.display_name(),
                    available: model.is_some(),
                    accuracy: model.map(|m| m.accuracy_label()),
                    trained_at: model.map(|m| m.trained_at.to_rfc3339()),
                }
            })
            .collect()
    }
}
