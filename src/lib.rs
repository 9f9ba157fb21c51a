pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod ml;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::{AppConfig, Variant};

pub use adapters::LocalStorage;
pub use crate::core::{etl::TrainingEngine, model_store::ModelStore, pipeline::TrainingPipeline};
pub use utils::error::{AppError, Result};
pub use web::{build_router, AppState};
