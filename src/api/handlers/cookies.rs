//! Cookie helpers for the session token and the stored `wantsurl`.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};

use crate::auth::SiteConfig;

pub(super) const SESSION_COOKIE_NAME: &str = "linkauth_session";
pub(super) const WANTSURL_COOKIE_NAME: &str = "linkauth_wantsurl";

const WANTSURL_TTL_SECONDS: i64 = 30 * 60;

pub(super) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            let val = parts.next()?.trim();
            (key == name && !val.is_empty()).then(|| val.to_string())
        })
        .next()
}

/// Build a `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    site: &SiteConfig,
    token: &str,
    ttl_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(site, SESSION_COOKIE_NAME, token, ttl_seconds)
}

/// Remember where an anonymous visitor was headed. The URL is base64url encoded
/// so any path or query survives the cookie syntax.
pub(super) fn wantsurl_cookie(
    site: &SiteConfig,
    wants_url: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let encoded = Base64UrlUnpadded::encode_string(wants_url.as_bytes());
    build_cookie(site, WANTSURL_COOKIE_NAME, &encoded, WANTSURL_TTL_SECONDS)
}

pub(super) fn decode_wants_url(value: &str) -> Option<String> {
    Base64UrlUnpadded::decode_vec(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

pub(super) fn clear_cookie(
    site: &SiteConfig,
    name: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(site, name, "", 0)
}

fn build_cookie(
    site: &SiteConfig,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    // Only mark cookies secure when the site is served over HTTPS.
    if site.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
