//! Session cookie contract: configuration, data model and the provider
//! implementing resolution and persistence.

mod config;
mod errors;
mod main;
pub(crate) mod types;

pub use config::CookieConfig;
pub use errors::SessionConfigError;
pub use main::{CookieSessionProvider, ProviderOptions, SetCookiesHook};
pub use types::{
    CookieExpiry, CookieOptions, CookieValueMap, MAX_PRIORITY, MIN_PRIORITY, PersistedCookie,
    SameSite, SessionCandidate, SessionData, SessionState, SessionUser, UserClaim,
};
