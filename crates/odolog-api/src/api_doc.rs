//! OpenAPI document assembly.

use odolog_core::models::{
    CompleteSubmissionRequest, CompleteSubmissionResponse, CreateSubmissionSessionRequest,
    CreateSubmissionSessionResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorResponse;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Odolog Submission API",
        description = "Two-phase odometer photo submission: open a session \
                       with a scoped upload credential, then verify and commit."
    ),
    paths(
        crate::handlers::health::ping,
        crate::handlers::submission_session::create_submission_session,
        crate::handlers::submission_session::complete_submission,
    ),
    components(schemas(
        CreateSubmissionSessionRequest,
        CreateSubmissionSessionResponse,
        CompleteSubmissionRequest,
        CompleteSubmissionResponse,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness"),
        (name = "submissions", description = "Upload session lifecycle")
    )
)]
struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_contains_all_routes() {
        let spec = get_openapi_spec();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/ping"));
        assert!(paths.contains_key("/createSubmissionSession"));
        assert!(paths.contains_key("/completeSubmission"));
    }
}
