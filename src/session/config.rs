use std::env;

/// Cookie behavior shared by every provider built from this configuration.
///
/// Values can be filled in directly or loaded from the environment via
/// [`CookieConfig::from_env`]. The `same_site` string is kept verbatim here
/// and validated when a provider is constructed, so a bad value fails loudly
/// at startup instead of being silently dropped per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Prefix prepended to every identity cookie name (`UserID`, `UserName`,
    /// `Token`, `LoggedOut`). The session cookie and the force-HTTPS marker
    /// are never prefixed.
    pub prefix: String,
    /// Path attribute on all cookies.
    pub path: String,
    /// Domain attribute, when explicitly pinned.
    pub domain: Option<String>,
    /// Always set the Secure attribute, regardless of per-session policy.
    pub secure: bool,
    /// Set HttpOnly on all cookies.
    pub http_only: bool,
    /// SameSite attribute. Empty means "emit no SameSite attribute".
    pub same_site: String,
    /// Overrides the session cookie name derived from `prefix`.
    pub session_cookie_name: Option<String>,
    /// Lifetime in seconds of identity cookies outside remember-me.
    /// `0` means session-only cookies.
    pub expiration: u64,
    /// Lifetime in seconds of remember-me-eligible cookies when the user
    /// asked to be remembered. Unset or `0` falls back to `expiration`.
    pub extended_expiration: Option<u64>,
    /// The whole site is served over HTTPS. The per-session force-HTTPS
    /// marker cookie carries no information then and is never written.
    pub global_force_https: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: "Lax".to_string(),
            session_cookie_name: None,
            expiration: 30 * 86400,
            extended_expiration: Some(180 * 86400),
            global_force_https: false,
        }
    }
}

impl CookieConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    ///
    /// Recognized variables: `COOKIE_PREFIX`, `COOKIE_PATH`, `COOKIE_DOMAIN`,
    /// `COOKIE_SECURE`, `COOKIE_HTTP_ONLY`, `COOKIE_SAME_SITE`,
    /// `SESSION_COOKIE_NAME`, `COOKIE_EXPIRATION`,
    /// `EXTENDED_LOGIN_COOKIE_EXPIRATION`, `GLOBAL_FORCE_HTTPS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            prefix: env::var("COOKIE_PREFIX").unwrap_or(defaults.prefix),
            path: env::var("COOKIE_PATH").unwrap_or(defaults.path),
            domain: env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            secure: env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.secure),
            http_only: env::var("COOKIE_HTTP_ONLY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_only),
            same_site: env::var("COOKIE_SAME_SITE").unwrap_or(defaults.same_site),
            session_cookie_name: env::var("SESSION_COOKIE_NAME").ok().filter(|n| !n.is_empty()),
            expiration: env::var("COOKIE_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expiration),
            extended_expiration: env::var("EXTENDED_LOGIN_COOKIE_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.extended_expiration),
            global_force_https: env::var("GLOBAL_FORCE_HTTPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.global_force_https),
        }
    }
}
