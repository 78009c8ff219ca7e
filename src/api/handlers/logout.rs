use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::cookies::{clear_cookie, read_cookie, SESSION_COOKIE_NAME, WANTSURL_COOKIE_NAME};
use crate::api::state::AppState;

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    if let Some(token) = read_cookie(&headers, SESSION_COOKIE_NAME) {
        if let Err(err) = state.sessions().revoke(&token).await {
            error!("Failed to revoke session: {err}");
        }
    }

    // Always clear the cookies, even if the session was already gone.
    let mut response_headers = HeaderMap::new();
    for name in [SESSION_COOKIE_NAME, WANTSURL_COOKIE_NAME] {
        if let Ok(cookie) = clear_cookie(state.site(), name) {
            response_headers.append(SET_COOKIE, cookie);
        }
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}
