use crate::domain::model::PassengerRecord;
use crate::ml::preprocessing::PreparedDataset;
use crate::utils::error::Result;
use async_trait::async_trait;
use ndarray::{ArrayView1, ArrayView2};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> bool;
}

/// A fitted binary classifier over scaled feature rows.
pub trait Classifier: Send + Sync {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<bool> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Training outcome handed back by a pipeline's load step.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model_path: String,
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PassengerRecord>>;
    async fn transform(&self, records: Vec<PassengerRecord>) -> Result<PreparedDataset>;
    async fn load(&self, prepared: PreparedDataset) -> Result<TrainingReport>;
}
