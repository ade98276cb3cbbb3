//! OpenAPI documentation, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AI Risk Radar API",
        version = "0.1.0",
        description = "Planning-risk extraction from project documents (txt, pdf, docx) via an LLM.",
    ),
    tags(
        (name = "Health", description = "Service banner and liveness"),
        (name = "Analysis", description = "Document upload and risk extraction"),
    ),
    paths(
        crate::api::health::root,
        crate::api::health::health,
        crate::api::analyze::analyze,
    ),
    components(schemas(
        crate::api::health::RootResponse,
        crate::api::health::HealthResponse,
        crate::api::analyze::ErrorBody,
    ))
)]
pub struct ApiDoc;
