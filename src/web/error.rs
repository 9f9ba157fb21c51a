use crate::utils::error::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::ModelNotFound { .. } | AppError::DatasetError { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {} (Category: {:?})", self, self.category());
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, self.user_friendly_message()).into_response()
    }
}
