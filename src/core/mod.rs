pub mod dataset;
pub mod encoder;
pub mod etl;
pub mod model_store;
pub mod pipeline;
pub mod predictor;
pub mod statistics;

pub use crate::domain::model::{DeathStatistics, PassengerFeatures, PassengerRecord, PredictionResult};
pub use crate::domain::ports::{Classifier, Pipeline, Storage, TrainingReport};
pub use crate::utils::error::Result;
