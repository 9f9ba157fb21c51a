//! Shared application state for the web server.

use crate::adapters::LocalStorage;
use crate::config::AppConfig;
use crate::core::dataset::load_dataset;
use crate::core::model_store::{ModelRegistry, ModelStore};
use crate::domain::model::PassengerRecord;
use crate::utils::error::{AppError, Result};
use crate::web::render::template_env;
use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Models and dataset are loaded once and swapped only by [`AppState::reload`].
pub struct AppState {
    pub config: AppConfig,
    pub templates: Environment<'static>,
    models: RwLock<Arc<ModelRegistry>>,
    dataset: RwLock<Option<Arc<Vec<PassengerRecord>>>>,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub models_loaded: usize,
    pub dataset_rows: Option<usize>,
}

impl AppState {
    /// Reads models and dataset from the configured paths. Missing or
    /// unreadable files are logged; requests needing them fail with 503.
    pub async fn load(config: AppConfig) -> Result<Self> {
        let state = Self::with_data(config, ModelRegistry::default(), None)?;
        if let Err(e) = state.reload().await {
            tracing::error!("❌ Initial load failed, serving without data: {}", e);
        }
        Ok(state)
    }

    pub fn with_data(
        config: AppConfig,
        models: ModelRegistry,
        dataset: Option<Vec<PassengerRecord>>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            templates: template_env()?,
            models: RwLock::new(Arc::new(models)),
            dataset: RwLock::new(dataset.map(Arc::new)),
        })
    }

    pub async fn models(&self) -> Arc<ModelRegistry> {
        self.models.read().await.clone()
    }

    pub async fn dataset(&self) -> Result<Arc<Vec<PassengerRecord>>> {
        self.dataset
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::DatasetError {
                message: format!("dataset {} is not loaded", self.config.data.dataset_path),
            })
    }

    /// Reads everything first and swaps models and dataset together; on error
    /// the previous state stays live. A missing dataset file clears the dataset.
    pub async fn reload(&self) -> Result<ReloadSummary> {
        tracing::info!("🔄 Loading models from {}", self.config.data.model_dir);
        let store = ModelStore::new(LocalStorage::new(self.config.model_dir()));
        let registry = store.load_all().await;

        let data = LocalStorage::new(".");
        let dataset = match load_dataset(&data, &self.config.data.dataset_path).await {
            Ok(records) => Some(Arc::new(records)),
            Err(AppError::IoError(e)) => {
                tracing::warn!(
                    "Dataset {} unavailable ({}), statistics are disabled",
                    self.config.data.dataset_path,
                    e
                );
                None
            }
            Err(e) => return Err(e),
        };

        let summary = ReloadSummary {
            models_loaded: registry.len(),
            dataset_rows: dataset.as_ref().map(|records| records.len()),
        };

        let mut models = self.models.write().await;
        let mut current = self.dataset.write().await;
        *models = Arc::new(registry);
        *current = dataset;

        Ok(summary)
    }
}
