//! Current account, or a bounce to the login page that remembers the target.

use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use url::form_urlencoded;
use utoipa::ToSchema;

use super::{cookies::wantsurl_cookie, internal_error, load_session, login_redirect};
use crate::{
    api::state::AppState,
    auth::{LoginOutcome, LoginParams},
};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub auth: String,
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Signed in account", body = MeResponse),
        (status = 303, description = "Not signed in, continue at the login page"),
    ),
    tag = "auth"
)]
pub async fn me(
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    state: Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let mut session = match load_session(&headers, &state).await {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };

    if let Some(account_id) = session.account_id() {
        match state.store().find_by_id(account_id).await {
            Ok(Some(account)) => {
                let body = MeResponse {
                    id: account.id.to_string(),
                    username: account.username,
                    auth: account.auth,
                };
                return (StatusCode::OK, Json(body)).into_response();
            }
            // Account removed since the session was issued.
            Ok(None) => session = session.without_account(),
            Err(err) => return internal_error(&err),
        }
    }

    let params = LoginParams::from_query(query);
    match state.plugin().pre_loginpage_hook(&params, &mut session).await {
        Ok(LoginOutcome::Redirect(target)) => login_redirect(&state, &session, &target),
        Ok(LoginOutcome::Continue) => require_login(&state, &uri),
        Err(err) => internal_error(&err),
    }
}

fn require_login(state: &AppState, uri: &Uri) -> Response {
    let login_url = state
        .site()
        .root()
        .join("login")
        .map_or_else(|_| "/login".to_string(), String::from);
    let mut response = Redirect::to(&login_url).into_response();

    match wantsurl_cookie(state.site(), &wants_url(uri)) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build wantsurl cookie: {err}"),
    }
    response
}

/// Current path and query, minus any credentials that came with it.
fn wants_url(uri: &Uri) -> String {
    let query = uri.query().map(|query| {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(
                form_urlencoded::parse(query.as_bytes())
                    .filter(|(key, _)| key != "username" && key != "password"),
            )
            .finish()
    });

    match query.filter(|query| !query.is_empty()) {
        Some(query) => format!("{}?{query}", uri.path()),
        None => uri.path().to_string(),
    }
}
