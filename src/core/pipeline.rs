use crate::core::dataset::load_dataset;
use crate::core::model_store::ModelStore;
use crate::core::{Pipeline, Storage, TrainingReport};
use crate::domain::model::{ModelCode, PassengerRecord};
use crate::domain::ports::Classifier;
use crate::ml::{accuracy_score, PreparedDataset, TrainedClassifier, TrainedModel};
use crate::utils::error::{AppError, Result};

/// Dataset → prepared split → fitted, persisted model for one model code.
pub struct TrainingPipeline<D: Storage, M: Storage> {
    data: D,
    dataset_path: String,
    models: ModelStore<M>,
    code: ModelCode,
}

impl<D: Storage, M: Storage> TrainingPipeline<D, M> {
    pub fn new(data: D, dataset_path: impl Into<String>, models: M, code: ModelCode) -> Self {
        Self {
            data,
            dataset_path: dataset_path.into(),
            models: ModelStore::new(models),
            code,
        }
    }
}

#[async_trait::async_trait]
impl<D: Storage, M: Storage> Pipeline for TrainingPipeline<D, M> {
    async fn extract(&self) -> Result<Vec<PassengerRecord>> {
        load_dataset(&self.data, &self.dataset_path).await
    }

    async fn transform(&self, records: Vec<PassengerRecord>) -> Result<PreparedDataset> {
        let prepared = PreparedDataset::from_records(&records)?;
        tracing::debug!(
            "Split {} rows into {} train / {} test",
            records.len(),
            prepared.x_train.nrows(),
            prepared.x_test.nrows()
        );
        Ok(prepared)
    }

    async fn load(&self, prepared: PreparedDataset) -> Result<TrainingReport> {
        let code = self.code;

        // 擬合屬 CPU 密集工作，移到 blocking 執行緒
        let (classifier, prepared, accuracy) = tokio::task::spawn_blocking(move || {
            let classifier =
                TrainedClassifier::fit(code, prepared.x_train.view(), prepared.y_train.view())?;
            let predictions = classifier.predict(prepared.x_test.view());
            let accuracy = accuracy_score(prepared.y_test.view(), &predictions)?;
            Ok::<_, AppError>((classifier, prepared, accuracy))
        })
        .await
        .map_err(|e| AppError::TrainingError {
            message: format!("training task failed: {}", e),
        })??;

        tracing::info!("{} Acc= {:.4}", code.as_str().to_uppercase(), accuracy);

        let model = TrainedModel {
            code,
            classifier,
            preprocessor: prepared.preprocessor,
            accuracy,
            train_rows: prepared.x_train.nrows(),
            test_rows: prepared.x_test.nrows(),
            trained_at: chrono::Utc::now(),
        };
        let model_path = self.models.save(&model).await?;

        Ok(TrainingReport {
            model_path,
            accuracy,
            train_rows: model.train_rows,
            test_rows: model.test_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                AppError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }

        fn exists(&self, path: &str) -> bool {
            self.files
                .try_lock()
                .map(|files| files.contains_key(path))
                .unwrap_or(false)
        }
    }

    fn csv_fixture(rows: usize) -> String {
        let mut csv = String::from("PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n");
        for i in 0..rows {
            let female = i % 2 == 0;
            let survived = if female { 1 } else { 0 };
            let sex = if female { "female" } else { "male" };
            let age = if i % 7 == 0 { String::new() } else { (18 + i % 40).to_string() };
            let embarked = ["S", "C", "Q"][i % 3];
            csv.push_str(&format!(
                "{},{},{},\"Passenger, No. {}\",{},{},{},{},T{},7.25,,{}\n",
                i + 1,
                survived,
                i % 3 + 1,
                i,
                sex,
                age,
                i % 2,
                i % 3,
                i,
                embarked
            ));
        }
        csv
    }

    #[tokio::test]
    async fn test_load_persists_model_with_accuracy() {
        let data = MockStorage::default();
        data.put("titanic.csv", csv_fixture(40).as_bytes()).await;
        let models = MockStorage::default();

        let pipeline = TrainingPipeline::new(data, "titanic.csv", models.clone(), ModelCode::Dt);
        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 40);

        let prepared = pipeline.transform(records).await.unwrap();
        assert_eq!(prepared.x_test.nrows(), 8);
        assert_eq!(prepared.x_train.nrows(), 32);

        let report = pipeline.load(prepared).await.unwrap();
        assert_eq!(report.model_path, "model_dt.json");
        // 性別完全決定結果，決策樹應全對
        assert_eq!(report.accuracy, 1.0);

        let saved = models.get_file("model_dt.json").await.unwrap();
        let model = TrainedModel::from_bytes(&saved).unwrap();
        assert_eq!(model.code, ModelCode::Dt);
        assert_eq!(model.test_rows, 8);
    }

    #[tokio::test]
    async fn test_missing_dataset_fails_extract() {
        let pipeline = TrainingPipeline::new(
            MockStorage::default(),
            "missing.csv",
            MockStorage::default(),
            ModelCode::Lr,
        );
        assert!(matches!(pipeline.extract().await, Err(AppError::IoError(_))));
    }
}
