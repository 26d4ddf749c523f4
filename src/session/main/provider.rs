use std::fmt;
use std::sync::Arc;

use crate::session::config::CookieConfig;
use crate::session::errors::SessionConfigError;
use crate::session::types::{
    CookieOptions, CookieValueMap, MAX_PRIORITY, MIN_PRIORITY, SameSite, SessionData,
};
use crate::userdb::{UserDirectory, UserRecord};
use crate::utils::RequestCookies;

use super::expiry::BASE_EXTENDED_FIELDS;
use super::{DELETED_SENTINEL, FORCE_HTTPS_COOKIE};

/// Callback invoked while persisting an identified user, before the cookie
/// set is finalized. It may rewrite the exported session data and the queued
/// cookie values (keyed by field name, before prefixing). The returned
/// boolean is advisory only; cookies are emitted either way.
pub type SetCookiesHook =
    Arc<dyn Fn(&UserRecord, &mut SessionData, &mut CookieValueMap) -> bool + Send + Sync>;

/// Construction-time options for a [`CookieSessionProvider`].
///
/// `priority` is the only required piece; everything else falls back to the
/// [`CookieConfig`] handed to [`CookieSessionProvider::new`].
#[derive(Clone, Default)]
pub struct ProviderOptions {
    /// Priority claimed by this provider's candidates. Required, and must
    /// lie within `MIN_PRIORITY..=MAX_PRIORITY`.
    pub priority: Option<i32>,
    /// Overrides both the config override and the prefix-derived default.
    pub session_cookie_name: Option<String>,
    /// Fully replaces the cookie attributes derived from the config.
    pub cookie_options: Option<CookieOptions>,
    /// Extra identity fields eligible for the extended remember-me lifetime,
    /// on top of the built-in `UserID`/`UserName`/`Token` set.
    pub additional_extended_fields: Vec<String>,
    /// Enables the set-cookies extension point. Absent means disabled.
    pub set_cookies_hook: Option<SetCookiesHook>,
}

/// Resolves session identity from request cookies and persists it back onto
/// responses.
///
/// One instance is built per cookie namespace (prefix) and shared across
/// requests; it holds only read-only configuration plus the user directory
/// handle, so sharing it between threads is safe.
pub struct CookieSessionProvider {
    pub(super) priority: i32,
    pub(super) session_cookie_name: String,
    pub(super) cookie_options: CookieOptions,
    pub(super) expiration: u64,
    pub(super) extended_expiration: Option<u64>,
    pub(super) global_force_https: bool,
    pub(super) extended_fields: Vec<String>,
    pub(super) set_cookies_hook: Option<SetCookiesHook>,
    pub(super) users: Arc<dyn UserDirectory>,
}

impl CookieSessionProvider {
    /// Builds a provider, validating everything that must not fail at
    /// request time.
    pub fn new(
        options: ProviderOptions,
        config: CookieConfig,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, SessionConfigError> {
        let priority = options.priority.ok_or(SessionConfigError::MissingPriority)?;
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            return Err(SessionConfigError::InvalidPriority(priority));
        }

        let cookie_options = match options.cookie_options {
            Some(overridden) => overridden,
            None => cookie_options_from_config(&config)?,
        };

        let session_cookie_name = options
            .session_cookie_name
            .or(config.session_cookie_name)
            .unwrap_or_else(|| format!("{}_session", cookie_options.prefix));

        let mut extended_fields: Vec<String> = BASE_EXTENDED_FIELDS
            .iter()
            .map(|field| field.to_string())
            .collect();
        for field in options.additional_extended_fields {
            if !extended_fields.contains(&field) {
                extended_fields.push(field);
            }
        }

        Ok(Self {
            priority,
            session_cookie_name,
            cookie_options,
            expiration: config.expiration,
            extended_expiration: config.extended_expiration,
            global_force_https: config.global_force_https,
            extended_fields,
            set_cookies_hook: options.set_cookies_hook,
            users,
        })
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Name of the session ID cookie. Unprefixed; defaults to
    /// `{prefix}_session` when neither the options nor the config name one.
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie_options
    }

    /// This provider round-trips session IDs through cookies.
    pub fn persists_session_id(&self) -> bool {
        true
    }

    /// A session resolved by this provider may later be re-bound to a
    /// different user (login/logout within one session).
    pub fn can_change_user(&self) -> bool {
        true
    }

    /// Cookie names whose values influence resolution. HTTP caches must
    /// vary on these.
    pub fn vary_cookies(&self) -> Vec<String> {
        vec![
            self.cookie_name("Token"),
            self.cookie_name("LoggedOut"),
            self.session_cookie_name.clone(),
            FORCE_HTTPS_COOKIE.to_string(),
        ]
    }

    /// Username to prefill a login form with, from the user-name cookie
    /// alone. Carries no verification whatsoever.
    pub fn suggest_login_username(&self, request: &impl RequestCookies) -> Option<String> {
        self.cookie(request, &self.cookie_name("UserName"))
    }

    /// Reads a cookie, treating the "deleted" placeholder some HTTP stacks
    /// leave behind as absent.
    pub(super) fn cookie(&self, request: &impl RequestCookies, name: &str) -> Option<String> {
        request
            .get_cookie(name)
            .filter(|value| value != DELETED_SENTINEL)
    }
}

fn cookie_options_from_config(config: &CookieConfig) -> Result<CookieOptions, SessionConfigError> {
    let same_site = if config.same_site.is_empty() {
        None
    } else {
        Some(SameSite::parse(&config.same_site).ok_or_else(|| {
            SessionConfigError::InvalidSameSite(config.same_site.clone())
        })?)
    };

    Ok(CookieOptions {
        prefix: config.prefix.clone(),
        path: config.path.clone(),
        domain: config.domain.clone(),
        secure: config.secure,
        http_only: config.http_only,
        same_site,
    })
}

impl fmt::Debug for CookieSessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSessionProvider")
            .field("priority", &self.priority)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("cookie_options", &self.cookie_options)
            .field("expiration", &self.expiration)
            .field("extended_expiration", &self.extended_expiration)
            .field("global_force_https", &self.global_force_https)
            .field("extended_fields", &self.extended_fields)
            .field("set_cookies_hook", &self.set_cookies_hook.is_some())
            .finish_non_exhaustive()
    }
}
