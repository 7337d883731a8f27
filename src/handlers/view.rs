use crate::error::{ApiError, ErrorResponse};
use crate::models::{Template, ViewQuery};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};

/// POST /view handler - Look up a template by exact name
///
/// When several templates share the name, the first one registered wins;
/// records registered in the same instant are ordered by id.
#[utoipa::path(
    post,
    path = routes::VIEW,
    params(ViewQuery),
    responses(
        (status = 200, description = "Template found", body = Template),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 404, description = "No template with this name", body = ErrorResponse),
        (status = 422, description = "Missing or undecodable template_name", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "templates"
)]
pub async fn view_handler(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let Query(query) = query?;
    let template_name = query.into_template_name()?;

    match state.store.find_first_by_name(&template_name).await? {
        Some(template) => {
            tracing::info!("Retrieved template {} with id: {}", template_name, template.id);
            Ok((StatusCode::OK, Json(template)))
        }
        None => {
            tracing::info!("Template not found: {}", template_name);
            Err(ApiError::TemplateNotFound(template_name))
        }
    }
}
