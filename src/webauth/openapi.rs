use super::handlers::{health, login, session};
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, login::login, session::session),
    components(schemas(
        health::Health,
        login::LoginResponse,
        session::SessionResponse,
        session::Viewer
    )),
    tags(
        (name = "webauth", description = "Session broker for the local admin interface"),
        (name = "auth", description = "Browser login and session status"),
        (name = "health", description = "Local API reachability")
    )
)]
struct ApiDoc;

/// `OpenAPI` document for every served route except itself.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

// axum handler for /openapi.json
pub async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}
