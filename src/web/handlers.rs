//! HTTP request handlers

use axum::{
    extract::{rejection::FormRejection, Form, Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::encoder::FeatureFields;
use crate::core::model_store::ModelSummary;
use crate::core::predictor::predict_result;
use crate::core::statistics::death_statistics;
use crate::domain::model::{DeathStatistics, ModelCode, PredictionResult, Sex};
use crate::utils::error::{AppError, Result};
use crate::web::render::{render_page, PageContext};
use crate::web::state::{ReloadSummary, SharedState};

pub const WELCOME_TEXT: &str = "Welcome to the Home Page!";
pub const SUBMIT_ACK: &str = "Form submitted successfully!";

// ============================================================================
// Greeting routes
// ============================================================================

pub async fn welcome() -> &'static str {
    WELCOME_TEXT
}

pub async fn hello(Path(name): Path<String>) -> String {
    format!("Hello, {}!", name)
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub data: String,
}

/// Acknowledges the form; the submitted value is not kept.
pub async fn submit(Form(form): Form<SubmitForm>) -> &'static str {
    tracing::debug!("Received form submission ({} bytes)", form.data.len());
    SUBMIT_ACK
}

pub async fn health() -> &'static str {
    "ok"
}

// ============================================================================
// Prediction
// ============================================================================

async fn run_prediction(
    state: &SharedState,
    fields: &FeatureFields,
) -> Result<(PredictionResult, DeathStatistics)> {
    let features = fields.to_features()?;
    let code = match fields.model.as_deref() {
        Some(code) if !code.trim().is_empty() => ModelCode::resolve(code),
        _ => state.config.default_model(),
    };

    let model = state.models().await.get(code)?;
    let result = predict_result(&model, &features);

    let dataset = state.dataset().await?;
    let statistics = death_statistics(&dataset, features.sex.as_str());

    info!(
        "🔮 {} -> {} ({}, death ratio {}%)",
        result.gender, result.outcome, result.model_name, statistics.death_ratio
    );
    Ok((result, statistics))
}

async fn page_for(state: &SharedState) -> PageContext {
    let models = state.models().await.summaries();
    PageContext::empty(models, state.config.default_model().as_str())
}

/// `GET /` on the prediction variant
pub async fn predict_form(State(state): State<SharedState>) -> Result<Html<String>> {
    let page = page_for(&state).await;
    Ok(Html(render_page(&state.templates, &page)?))
}

/// `POST /`: `sex` and the optional fields come from the query string first,
/// then the form body. Malformed fields are shown on the page with a 400.
pub async fn predict_submit(
    State(state): State<SharedState>,
    Query(query): Query<FeatureFields>,
    form: std::result::Result<Form<FeatureFields>, FormRejection>,
) -> Result<(StatusCode, Html<String>)> {
    let fields = match form {
        Ok(Form(body)) => query.or(body),
        Err(rejection) => {
            tracing::debug!("No usable form body: {}", rejection);
            query
        }
    };

    let mut page = page_for(&state).await;
    page.sex = Sex::parse(fields.sex.as_deref().unwrap_or_default()).as_str();

    let status = match run_prediction(&state, &fields).await {
        Ok((result, statistics)) => {
            page.selected_model = result.model_code.as_str();
            page.result = Some(result);
            page.statistics = Some(statistics);
            StatusCode::OK
        }
        Err(AppError::BadRequest { message }) => {
            tracing::debug!("Rejected prediction form: {}", message);
            page.error = Some(message);
            StatusCode::BAD_REQUEST
        }
        Err(e) => return Err(e),
    };

    Ok((status, Html(render_page(&state.templates, &page)?)))
}

// ============================================================================
// JSON API
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub sex: String,
    pub pclass: Option<u8>,
    pub age: Option<f64>,
    pub sibsp: Option<u32>,
    pub parch: Option<u32>,
    pub model: Option<String>,
}

impl From<PredictRequest> for FeatureFields {
    fn from(req: PredictRequest) -> Self {
        FeatureFields {
            sex: Some(req.sex),
            pclass: req.pclass.map(|v| v.to_string()),
            age: req.age.map(|v| v.to_string()),
            sibsp: req.sibsp.map(|v| v.to_string()),
            parch: req.parch.map(|v| v.to_string()),
            model: req.model,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: PredictionResult,
    pub statistics: DeathStatistics,
}

pub async fn api_predict(
    State(state): State<SharedState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>> {
    let fields = FeatureFields::from(request);
    let (prediction, statistics) = run_prediction(&state, &fields).await?;
    Ok(Json(PredictResponse {
        prediction,
        statistics,
    }))
}

pub async fn api_stats(
    State(state): State<SharedState>,
    Path(sex): Path<String>,
) -> Result<Json<DeathStatistics>> {
    let dataset = state.dataset().await?;
    Ok(Json(death_statistics(&dataset, &sex)))
}

pub async fn api_models(State(state): State<SharedState>) -> Json<Vec<ModelSummary>> {
    Json(state.models().await.summaries())
}

pub async fn admin_reload(State(state): State<SharedState>) -> Result<Json<ReloadSummary>> {
    let summary = state.reload().await?;
    info!(
        "🔄 Reloaded {} models, dataset rows: {:?}",
        summary.models_loaded, summary.dataset_rows
    );
    Ok(Json(summary))
}
