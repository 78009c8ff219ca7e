//! Login page (with the link hook) and the generic form login.

use axum::{
    extract::{Extension, Form, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{internal_error, load_session, login_redirect};
use crate::{
    api::state::AppState,
    auth::{resolve, LoginOutcome, LoginParams, RealmScope, RedirectIntent, SessionContext, StoreError},
};

/// What the login page needs to know about the active strategy.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginPage {
    pub auth: String,
    pub logged_in: bool,
    pub can_change_password: bool,
    pub can_reset_password: bool,
    pub change_password_url: Option<String>,
}

#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub wantsurl: Option<String>,
}

// Never derive Debug with the raw password.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("wantsurl", &self.wantsurl)
            .finish_non_exhaustive()
    }
}

#[utoipa::path(
    get,
    path = "/login",
    params(
        ("username" = Option<String>, Query, description = "Account to sign in as"),
        ("password" = Option<String>, Query, description = "Password for existing accounts"),
        ("wantsurl" = Option<String>, Query, description = "Same-origin URL to continue to"),
    ),
    responses(
        (status = 200, description = "Render the login page", body = LoginPage),
        (status = 303, description = "Signed in from link parameters"),
    ),
    tag = "auth"
)]
pub async fn login_page(
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    state: Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let mut session = match load_session(&headers, &state).await {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };

    let params = LoginParams::from_query(query);
    match state.plugin().loginpage_hook(&params, &mut session).await {
        Ok(LoginOutcome::Redirect(target)) => login_redirect(&state, &session, &target),
        Ok(LoginOutcome::Continue) => {
            let plugin = state.plugin();
            let page = LoginPage {
                auth: plugin.auth_type().to_string(),
                logged_in: session.is_logged_in(),
                can_change_password: plugin.can_change_password(),
                can_reset_password: plugin.can_reset_password(),
                change_password_url: plugin.change_password_url().map(String::from),
            };
            (StatusCode::OK, Json(page)).into_response()
        }
        Err(err) => internal_error(&err),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in"),
        (status = 401, description = "Invalid login"),
    ),
    tag = "auth"
)]
#[instrument(skip(headers, query, state))]
pub async fn login(
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    state: Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let username = form.username.trim();
    if username.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Invalid login").into_response();
    }
    let password = SecretString::from(form.password);

    let mut session = match load_session(&headers, &state).await {
        Ok(session) => session,
        Err(err) => return internal_error(&err),
    };

    match authenticate(&state, username, &password, &mut session).await {
        Ok(true) => {
            let intent = RedirectIntent::new(query)
                .with_session_wants_url(session.wants_url())
                .with_request_wants_url(form.wantsurl.as_deref());
            login_redirect(&state, &session, &resolve(&intent, state.site()))
        }
        Ok(false) => {
            info!("Login rejected");
            (StatusCode::UNAUTHORIZED, "Invalid login").into_response()
        }
        Err(err) => internal_error(&err),
    }
}

/// Generic login: ask the strategy, then bind the local account, creating it on
/// first use. Internal strategies keep the first password as the local one.
async fn authenticate(
    state: &AppState,
    username: &str,
    password: &SecretString,
    session: &mut SessionContext,
) -> Result<bool, StoreError> {
    if !state.plugin().user_login(username, password).await? {
        return Ok(false);
    }

    let host_id = state.site().local_host_id();
    let account = match state
        .store()
        .find_by_username(username, RealmScope::Host(host_id))
        .await?
    {
        Some(account) => account,
        None => {
            state
                .store()
                .create_account(
                    username,
                    state.plugin().auth_type(),
                    host_id,
                    state.plugin().is_internal().then_some(password),
                )
                .await?
        }
    };

    state.sessions().complete_login(session, &account).await?;
    info!(account_id = %account.id, "Login completed");
    Ok(true)
}
