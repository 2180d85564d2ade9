use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use quoterack_core::CatalogError;

#[derive(Debug)]
pub enum ApiError {
    Validation { field: &'static str, message: String },
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { field, message } => Self::Validation { field, message },
            CatalogError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} {id} not found"))
            }
            CatalogError::DuplicateName(name) => {
                Self::Conflict(format!("a product named \"{name}\" already exists"))
            }
            CatalogError::Storage(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Internal(err) => {
                // Logged here; the client only sees a generic message.
                tracing::error!("storage failure: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
