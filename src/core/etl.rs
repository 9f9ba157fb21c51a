use crate::core::{Pipeline, TrainingReport};
use crate::utils::error::Result;
use crate::utils::monitor::TrainingMonitor;

/// Runs a pipeline's extract, transform and load steps in order.
pub struct TrainingEngine<P: Pipeline> {
    pipeline: P,
    monitor: TrainingMonitor,
}

impl<P: Pipeline> TrainingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: TrainingMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<TrainingReport> {
        tracing::info!("🚂 Starting training run");
        self.monitor.log_phase("Start");

        // Extract
        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} passenger records", records.len());
        self.monitor.log_phase("Extract");

        // Transform
        let prepared = self.pipeline.transform(records).await?;
        tracing::info!(
            "Prepared {} training / {} test rows",
            prepared.x_train.nrows(),
            prepared.x_test.nrows()
        );
        self.monitor.log_phase("Transform");

        // Load
        let report = self.pipeline.load(prepared).await?;
        tracing::info!(
            "✅ Model saved to {} (accuracy {:.2}%)",
            report.model_path,
            report.accuracy * 100.0
        );
        self.monitor.log_phase("Load");

        Ok(report)
    }
}
