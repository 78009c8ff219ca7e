use utoipa::OpenApi;

use super::handlers::{health, login, logout, me};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login_page,
        login::login,
        logout::logout,
        me::me,
    ),
    components(schemas(login::LoginPage, login::LoginForm, me::MeResponse)),
    tags(
        (name = "auth", description = "Authorization by direct link"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

/// OpenAPI document for every documented route.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
