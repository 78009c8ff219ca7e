//! Route handlers and the session plumbing they share.

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::{login, login_page};

pub mod logout;
pub use self::logout::logout;

pub mod me;
pub use self::me::me;

mod cookies;

use axum::{
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;
use url::Url;

use super::state::AppState;
use crate::auth::{SessionContext, StoreError};
use cookies::{
    clear_cookie, decode_wants_url, read_cookie, session_cookie, SESSION_COOKIE_NAME,
    WANTSURL_COOKIE_NAME,
};

/// Build the session view for this request from its cookies.
pub(crate) async fn load_session(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<SessionContext, StoreError> {
    let mut session = SessionContext::new();

    if let Some(token) = read_cookie(headers, SESSION_COOKIE_NAME) {
        if let Some(account_id) = state.sessions().resume(&token).await? {
            session = session.with_account(account_id);
        }
    }

    if let Some(wants_url) =
        read_cookie(headers, WANTSURL_COOKIE_NAME).and_then(|value| decode_wants_url(&value))
    {
        session = session.with_wants_url(wants_url);
    }

    Ok(session)
}

/// Redirect after a completed login, handing out the new session cookie.
pub(crate) fn login_redirect(state: &AppState, session: &SessionContext, target: &Url) -> Response {
    let mut response = Redirect::to(target.as_str()).into_response();
    let headers = response.headers_mut();

    if let Some(token) = session.issued_token() {
        match session_cookie(state.site(), token, state.session_ttl_seconds()) {
            Ok(cookie) => {
                headers.append(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build session cookie: {err}"),
        }
    }

    // The stored target is consumed by this redirect.
    if session.wants_url().is_some() {
        if let Ok(cookie) = clear_cookie(state.site(), WANTSURL_COOKIE_NAME) {
            headers.append(SET_COOKIE, cookie);
        }
    }

    response
}

pub(crate) fn internal_error(err: &StoreError) -> Response {
    error!("Authentication backend failure: {err}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
