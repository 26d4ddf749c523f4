//! Cookie-based session identity resolution and persistence.
//!
//! This crate turns the bag of cookies on an inbound HTTP request into a
//! trusted session identity, and turns a live session back into the exact
//! set of cookies an outbound response must carry. It is the glue between
//! "client-supplied strings" and "a (session id, user id, verified token)
//! triple", including the defenses that glue needs:
//!
//! - constant-time token verification against a user directory
//! - rejection of partial or mismatched identity cookie sets
//! - remember-me vs. normal vs. immediate cookie lifetimes
//! - a force-HTTPS marker cookie and a logged-out timestamp cookie
//!
//! The crate deliberately owns nothing beyond the cookie contract. Session
//! storage, user accounts and the HTTP stack are reached through narrow
//! traits ([`UserDirectory`], [`RequestCookies`], [`ResponseCookieSink`]),
//! with ready-made adapters for `http::HeaderMap`, `headers::Cookie` and
//! plain maps.
//!
//! ## Quick start
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use cookie_session_provider::{
//!     CookieConfig, CookieSessionProvider, MemoryResponse, MemoryUserDirectory,
//!     ProviderOptions, SessionState, SessionUser, UserRecord,
//! };
//!
//! let mut users = MemoryUserDirectory::new();
//! users.insert(UserRecord::new(7, "Alice", "0123456789abcdef0123456789abcdef"));
//!
//! let provider = CookieSessionProvider::new(
//!     ProviderOptions {
//!         priority: Some(50),
//!         ..ProviderOptions::default()
//!     },
//!     CookieConfig::default(),
//!     Arc::new(users),
//! )?;
//!
//! // No cookies yet: the provider has no opinion about this request.
//! let request: HashMap<String, String> = HashMap::new();
//! assert!(provider.resolve(&request).is_none());
//!
//! // Persist a logged-in session and inspect what would be sent.
//! let mut session = SessionState {
//!     id: "fedcba9876543210fedcba9876543210".to_string(),
//!     user: SessionUser::Identified(UserRecord::new(
//!         7,
//!         "Alice",
//!         "0123456789abcdef0123456789abcdef",
//!     )),
//!     remember_user: true,
//!     force_https: false,
//!     logged_out_at: None,
//!     data: Default::default(),
//! };
//! let mut response = MemoryResponse::new();
//! provider.persist(&mut session, &request, &mut response);
//! assert!(!response.cookies().is_empty());
//! # Ok::<(), cookie_session_provider::SessionConfigError>(())
//! ```

mod session;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use session::{
    CookieConfig, CookieExpiry, CookieOptions, CookieSessionProvider, CookieValueMap,
    MAX_PRIORITY, MIN_PRIORITY, PersistedCookie, ProviderOptions, SameSite, SessionCandidate,
    SessionConfigError, SessionData, SessionState, SessionUser, SetCookiesHook, UserClaim,
};
pub use userdb::{MemoryUserDirectory, UserDirectory, UserRecord};
pub use utils::{
    HeaderResponse, MemoryResponse, RequestCookies, ResponseCookieSink, UtilError,
    append_set_cookie, render_set_cookie,
};
