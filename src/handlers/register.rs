use crate::error::{ApiError, ErrorResponse};
use crate::models::{RegisterRequest, RegisterResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::{SubsecRound, Utc};

/// POST /register handler - Store a new image template
///
/// Validation runs before anything touches the store. Names are not checked
/// for uniqueness.
#[utoipa::path(
    post,
    path = routes::REGISTER,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Template registered", body = RegisterResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorResponse),
        (status = 409, description = "Supplied id already exists", body = ErrorResponse),
        (status = 422, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "templates"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    // Millisecond precision, the resolution MongoDB stores dates at
    let template = request.into_template(Utc::now().trunc_subsecs(3))?;

    let id = state.store.insert(&template).await?;

    tracing::info!(
        "Template Name {}, With Id {} Successfully Registered",
        template.template_name,
        id
    );
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}
