//! Post-login destination resolution.
//!
//! Precedence, first match wins:
//! 1. `wantsurl` stored in the session, with the request query re-appended.
//! 2. `wantsurl` request parameter, as given.
//! 3. The site root, with the request query re-appended.
//!
//! A candidate only matches when it resolves onto the site's own origin; anything
//! else is skipped and resolution continues with the next rule, so the site root
//! is always a valid answer.

use tracing::warn;
use url::{form_urlencoded, Url};

use super::site::SiteConfig;

/// Request parameters that are consumed by the login and never forwarded.
const CONSUMED_PARAMS: [&str; 3] = ["username", "password", "wantsurl"];

#[derive(Clone, Debug, Default)]
pub struct RedirectIntent {
    pub session_wants_url: Option<String>,
    pub request_wants_url: Option<String>,
    /// Raw query parameters of the current request, in order.
    pub query: Vec<(String, String)>,
}

impl RedirectIntent {
    #[must_use]
    pub fn new(query: Vec<(String, String)>) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_session_wants_url(mut self, url: Option<&str>) -> Self {
        self.session_wants_url = url.map(ToString::to_string);
        self
    }

    #[must_use]
    pub fn with_request_wants_url(mut self, url: Option<&str>) -> Self {
        self.request_wants_url = url.map(ToString::to_string);
        self
    }
}

/// Compute the single destination for a freshly authenticated client.
#[must_use]
pub fn resolve(intent: &RedirectIntent, site: &SiteConfig) -> Url {
    if let Some(candidate) = non_empty(intent.session_wants_url.as_deref()) {
        match site.same_origin(candidate) {
            Some(target) => return with_params(target, &intent.query),
            None => warn!("Ignoring off-site session wantsurl: {candidate}"),
        }
    }

    if let Some(candidate) = non_empty(intent.request_wants_url.as_deref()) {
        match site.same_origin(candidate) {
            Some(target) => return target,
            None => warn!("Ignoring off-site wantsurl parameter: {candidate}"),
        }
    }

    with_params(site.root().clone(), &intent.query)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Merge request parameters into the target's own query, request values winning.
///
/// Target segments that are not overridden are kept byte for byte; a target
/// without request parameters to add is returned untouched.
fn with_params(mut url: Url, params: &[(String, String)]) -> Url {
    let mut extra: Vec<(&str, &str)> = Vec::new();
    for (key, value) in params
        .iter()
        .filter(|(key, _)| !CONSUMED_PARAMS.contains(&key.as_str()))
    {
        match extra.iter_mut().find(|(name, _)| *name == key.as_str()) {
            Some(existing) => existing.1 = value.as_str(),
            None => extra.push((key.as_str(), value.as_str())),
        }
    }

    if extra.is_empty() {
        return url;
    }

    let mut placed: Vec<&str> = Vec::new();
    let mut segments: Vec<String> = Vec::new();
    for segment in url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
    {
        let name = form_urlencoded::parse(segment.as_bytes())
            .next()
            .map(|(name, _)| name.into_owned())
            .unwrap_or_default();
        match extra.iter().find(|(key, _)| *key == name) {
            Some(&(key, value)) => {
                if !placed.contains(&key) {
                    placed.push(key);
                    segments.push(encode_pair(key, value));
                }
            }
            None => segments.push(segment.to_string()),
        }
    }
    for &(key, value) in &extra {
        if !placed.contains(&key) {
            segments.push(encode_pair(key, value));
        }
    }

    url.set_query(Some(&segments.join("&")));
    url
}

fn encode_pair(key: &str, value: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish()
}
