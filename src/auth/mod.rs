//! Passthrough authentication strategy and the contracts it depends on.

mod error;
mod interceptor;
mod link;
pub mod memory;
mod password;
mod plugin;
pub mod redirect;
mod session;
mod site;
mod store;
pub(crate) mod utils;

pub use error::StoreError;
pub use interceptor::{LoginInterceptor, LoginParams};
pub use link::{LinkAuth, AUTH_TYPE};
pub use password::{hash_password, verify_password};
pub use plugin::{AuthPlugin, LoginOutcome};
pub use redirect::{resolve, RedirectIntent};
pub use session::{SessionContext, SessionManager};
pub use site::SiteConfig;
pub use store::{AccountRecord, CredentialStore, RealmScope};
