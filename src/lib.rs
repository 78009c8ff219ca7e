//! # linkauth (Authorization by direct link)
//!
//! `linkauth` is a passthrough authentication strategy: any username may sign in
//! without a credential check against an external identity provider, unless the
//! host already keeps a local account for that username, in which case the local
//! password still gates access.
//!
//! ## Login page interception
//!
//! A login page request that carries `username` and `password` parameters is
//! completed without rendering the form. The browser is then sent to the page it
//! originally wanted (`wantsurl`), restricted to the site's own origin so the
//! redirect target can never point at a foreign host.
//!
//! ## Collaborators
//!
//! Account storage and sessions are host concerns, expressed as the
//! [`auth::CredentialStore`] and [`auth::SessionManager`] traits. The crate ships
//! Postgres backed implementations in [`storage`] and in-memory ones in
//! [`auth::memory`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
