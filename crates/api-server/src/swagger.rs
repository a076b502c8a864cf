//! OpenAPI document, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QArk Site API",
        version = "0.1.0",
        description = "Contact and demo-request relay for the QArk marketing site.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Contact", description = "Contact form and demo-access requests"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        crate::contact_rest::handle_contact,
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        qark_core::contact::ContactSubmission,
        qark_core::contact::ContactFields,
        qark_core::contact::Honeypot,
        qark_core::contact::ContactSentResponse,
        qark_core::contact::ContactErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
