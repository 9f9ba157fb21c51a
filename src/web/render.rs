use crate::core::model_store::ModelSummary;
use crate::domain::model::{DeathStatistics, PassengerFeatures, PredictionResult, Sex};
use crate::utils::error::Result;
use minijinja::Environment;
use serde::Serialize;

pub const INDEX_TEMPLATE: &str = "index.html";

/// Builds the template environment once at start-up.
pub fn template_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
    Ok(env)
}

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub sex: &'static str,
    pub demo: PassengerFeatures,
    pub models: Vec<ModelSummary>,
    pub selected_model: &'static str,
    pub result: Option<PredictionResult>,
    pub statistics: Option<DeathStatistics>,
    pub error: Option<String>,
}

impl PageContext {
    pub fn empty(models: Vec<ModelSummary>, selected_model: &'static str) -> Self {
        Self {
            sex: Sex::Female.as_str(),
            demo: PassengerFeatures::demo(Sex::Female),
            models,
            selected_model,
            result: None,
            statistics: None,
            error: None,
        }
    }
}

pub fn render_page(env: &Environment<'static>, page: &PageContext) -> Result<String> {
    let template = env.get_template(INDEX_TEMPLATE)?;
    Ok(template.render(page)?)
}
