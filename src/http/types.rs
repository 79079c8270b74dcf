use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::validation::{FieldError, ValidationError};
use crate::domain::repository::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self { Self { message: message.into(), errors: Vec::new() } }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                (StatusCode::BAD_REQUEST, axum::Json(ErrorBody { message: "Validation failed".into(), errors: err.errors })).into_response()
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, axum::Json(ErrorBody::message(message))).into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store failure");
                let status = match err {
                    StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    StoreError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, axum::Json(ErrorBody::message(err.to_string()))).into_response()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleSearch {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionSearch {
    pub description: String,
}
