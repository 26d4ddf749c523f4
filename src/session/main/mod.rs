mod expiry;
mod persist;
mod provider;
mod resolve;

pub use provider::{CookieSessionProvider, ProviderOptions, SetCookiesHook};

/// Name of the force-HTTPS marker cookie. Never prefixed, never Secure:
/// it has to be readable on the plain-HTTP hop that triggers the upgrade.
pub(crate) const FORCE_HTTPS_COOKIE: &str = "forceHTTPS";

/// Cookie value some HTTP stacks substitute when clearing a cookie.
/// Treated everywhere as "cookie not present".
pub(crate) const DELETED_SENTINEL: &str = "deleted";
