use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::store::StoreError;

/// Error response type
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
    /// Per-field messages, present on validation failures only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every failure a handler can hit maps to one variant here, and each variant
/// to a status code plus an [`ErrorResponse`] body.
#[derive(Debug)]
pub enum ApiError {
    /// Request fields failed validation
    Validation(ValidationErrors),
    /// Body or query string could not be parsed into the expected shape
    InvalidRequest(StatusCode, String),
    /// No template registered under this name
    TemplateNotFound(String),
    /// Client-supplied id is already taken
    DuplicateId(String),
    /// Database operation error
    DatabaseError(anyhow::Error),
}

impl ApiError {
    fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
        errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail, fields) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
                Some(Self::field_messages(&errors)),
            ),
            ApiError::InvalidRequest(status, message) => (status, message, None),
            ApiError::TemplateNotFound(name) => (
                StatusCode::NOT_FOUND,
                format!("Template {} not found", name),
                None,
            ),
            ApiError::DuplicateId(id) => (
                StatusCode::CONFLICT,
                format!("Template id {} already exists", id),
                None,
            ),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {:#}", err),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { detail, fields })).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateId(id) => ApiError::DuplicateId(id),
            StoreError::Backend(err) => ApiError::DatabaseError(err),
        }
    }
}
