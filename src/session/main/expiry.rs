use super::provider::CookieSessionProvider;

/// Identity cookie fields that are always remember-me eligible.
pub(crate) const BASE_EXTENDED_FIELDS: [&str; 3] = ["UserID", "UserName", "Token"];

impl CookieSessionProvider {
    /// Final cookie name for an identity field: configured prefix + field.
    pub fn cookie_name(&self, field: &str) -> String {
        format!("{}{}", self.cookie_options.prefix, field)
    }

    /// Identity fields eligible for the extended remember-me lifetime.
    pub fn extended_login_fields(&self) -> &[String] {
        &self.extended_fields
    }

    pub(super) fn is_extended_field(&self, field: &str) -> bool {
        self.extended_fields.iter().any(|f| f == field)
    }

    /// Lifetime in seconds for an identity cookie, or `None` for a
    /// browser-session cookie.
    ///
    /// Remember-me grants the extended duration to eligible fields. An
    /// extended duration configured as zero or left unset falls back to the
    /// normal duration; a normal duration of zero means session-only.
    pub fn login_cookie_expiration(&self, field: &str, remember: bool) -> Option<u64> {
        if remember && self.is_extended_field(field) {
            if let Some(extended) = self.extended_expiration.filter(|d| *d > 0) {
                return Some(extended);
            }
        }
        (self.expiration > 0).then_some(self.expiration)
    }

    /// How long a remembered login survives, or `None` when even the token
    /// cookie would be session-only. Login UIs surface this to the user.
    pub fn remember_user_duration(&self) -> Option<u64> {
        self.login_cookie_expiration("Token", true)
    }
}
