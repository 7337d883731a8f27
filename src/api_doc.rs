use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{RegisterRequest, RegisterResponse, Template};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "template-registry API",
        version = "1.0.0",
        description = "Registers named image templates and looks them up by name, backed by MongoDB"
    ),
    paths(
        handlers::health::health_handler,
        handlers::register::register_handler,
        handlers::view::view_handler
    ),
    components(
        schemas(
            Template,
            RegisterRequest,
            RegisterResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "templates", description = "Image template operations")
    )
)]
pub struct ApiDoc;
