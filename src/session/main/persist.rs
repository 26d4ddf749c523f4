use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::session::types::{
    CookieExpiry, CookieValueMap, PersistedCookie, SessionData, SessionState, SessionUser,
};
use crate::userdb::UserRecord;
use crate::utils::{RequestCookies, ResponseCookieSink};

use super::FORCE_HTTPS_COOKIE;
use super::provider::CookieSessionProvider;

/// A logout older than this is not worth telling other devices about.
const LOGGED_OUT_WINDOW_DAYS: i64 = 2;

impl CookieSessionProvider {
    /// Writes the cookies that encode `session` onto the response.
    ///
    /// The inbound request is consulted only for the logged-out marker's
    /// idempotence check. When the response headers are already on the wire
    /// nothing is written and the set-cookies hook does not run.
    #[tracing::instrument(skip_all, fields(session_id = %session.id))]
    pub fn persist(
        &self,
        session: &mut SessionState,
        request: &impl RequestCookies,
        response: &mut impl ResponseCookieSink,
    ) {
        self.persist_at(session, request, response, Utc::now());
    }

    pub(crate) fn persist_at(
        &self,
        session: &mut SessionState,
        request: &impl RequestCookies,
        response: &mut impl ResponseCookieSink,
        now: DateTime<Utc>,
    ) {
        if response.headers_sent() {
            tracing::debug!(
                "Not persisting session \"{}\": headers already sent",
                session.id
            );
            return;
        }

        let remember = session.remember_user;
        let secure = self.effective_secure(session.force_https);

        // The session cookie lives exactly as long as the browser session,
        // remember-me or not.
        response.set_cookie(self.build_cookie(
            self.session_cookie_name.clone(),
            session.id.clone(),
            CookieExpiry::Session,
            secure,
        ));

        let mut cookies = cookie_data_to_export(&session.user, remember);
        if let (Some(hook), SessionUser::Identified(user)) =
            (&self.set_cookies_hook, &session.user)
        {
            let mut exported = session_data_to_export(user);
            let proceed = hook(user, &mut exported, &mut cookies);
            if !proceed {
                tracing::debug!(
                    "Set-cookies hook declined for user {}; cookies are written regardless",
                    user.id
                );
            }
            for (key, value) in exported {
                session.data.insert(key, value);
            }
        }

        for (field, value) in &cookies {
            let name = self.cookie_name(field);
            match value {
                None => response.set_cookie(self.clear_cookie(name, secure)),
                Some(value) => {
                    let expiry = match self.login_cookie_expiration(field, remember) {
                        Some(duration) => {
                            CookieExpiry::At(now + Duration::seconds(duration as i64))
                        }
                        None => CookieExpiry::Session,
                    };
                    response.set_cookie(self.build_cookie(name, value.clone(), expiry, secure));
                }
            }
        }

        self.set_force_https_cookie(session.force_https, remember, now, response);

        if let Some(logged_out) = session.logged_out_at {
            if !session.user.is_anonymous() {
                self.set_logged_out_cookie_at(
                    logged_out,
                    request,
                    response,
                    session.force_https,
                    now,
                );
            }
        }
    }

    /// Clears every cookie this provider may have written, except the
    /// logged-out marker, which other devices still need to see.
    pub fn unpersist(&self, response: &mut impl ResponseCookieSink) {
        if response.headers_sent() {
            tracing::debug!("Not clearing session cookies: headers already sent");
            return;
        }

        let secure = self.effective_secure(false);
        if !self.global_force_https {
            response.set_cookie(self.clear_cookie(FORCE_HTTPS_COOKIE.to_string(), false));
        }
        response.set_cookie(self.clear_cookie(self.session_cookie_name.clone(), secure));
        for field in ["UserID", "UserName", "Token"] {
            response.set_cookie(self.clear_cookie(self.cookie_name(field), secure));
        }
    }

    /// Records the most recent explicit logout in the logged-out cookie.
    ///
    /// Written only when the timestamp is strictly positive, no older than
    /// the staleness window, and strictly newer than whatever value the
    /// client already presented. Anything else is a no-op, which keeps
    /// repeated calls from re-sending the same cookie on every response.
    pub fn set_logged_out_cookie(
        &self,
        logged_out: DateTime<Utc>,
        request: &impl RequestCookies,
        response: &mut impl ResponseCookieSink,
    ) {
        if response.headers_sent() {
            tracing::debug!("Not setting logged-out cookie: headers already sent");
            return;
        }
        self.set_logged_out_cookie_at(logged_out, request, response, false, Utc::now());
    }

    pub(crate) fn set_logged_out_cookie_at(
        &self,
        logged_out: DateTime<Utc>,
        request: &impl RequestCookies,
        response: &mut impl ResponseCookieSink,
        force_https: bool,
        now: DateTime<Utc>,
    ) {
        let timestamp = logged_out.timestamp();
        if timestamp <= 0 {
            return;
        }
        if logged_out + Duration::days(LOGGED_OUT_WINDOW_DAYS) <= now {
            return;
        }
        let presented = self
            .cookie(request, &self.cookie_name("LoggedOut"))
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0);
        if timestamp <= presented {
            return;
        }

        response.set_cookie(self.build_cookie(
            self.cookie_name("LoggedOut"),
            timestamp.to_string(),
            CookieExpiry::Session,
            self.effective_secure(force_https),
        ));
    }

    /// Writes or clears the force-HTTPS marker cookie.
    ///
    /// The marker is never Secure: it must be readable on the plain-HTTP
    /// hop that triggers the upgrade. When the whole site already forces
    /// HTTPS the marker carries no information and is neither written nor
    /// cleared.
    fn set_force_https_cookie(
        &self,
        force: bool,
        remember: bool,
        now: DateTime<Utc>,
        response: &mut impl ResponseCookieSink,
    ) {
        if self.global_force_https {
            return;
        }
        if force {
            // The marker lives exactly as long as the identity cookies it
            // escorts; UserID stands in for that class.
            let expiry = match self.login_cookie_expiration("UserID", remember) {
                Some(duration) => CookieExpiry::At(now + Duration::seconds(duration as i64)),
                None => CookieExpiry::Session,
            };
            response.set_cookie(self.build_cookie(
                FORCE_HTTPS_COOKIE.to_string(),
                "true".to_string(),
                expiry,
                false,
            ));
        } else {
            response.set_cookie(self.clear_cookie(FORCE_HTTPS_COOKIE.to_string(), false));
        }
    }

    pub(super) fn effective_secure(&self, session_force_https: bool) -> bool {
        self.cookie_options.secure || session_force_https || self.global_force_https
    }

    fn build_cookie(
        &self,
        name: String,
        value: String,
        expiry: CookieExpiry,
        secure: bool,
    ) -> PersistedCookie {
        PersistedCookie {
            name,
            value,
            expiry,
            path: self.cookie_options.path.clone(),
            domain: self.cookie_options.domain.clone(),
            secure,
            http_only: self.cookie_options.http_only,
            same_site: self.cookie_options.same_site,
            raw: false,
        }
    }

    /// "Clear" is a cookie write too: empty value, expiry in the past.
    fn clear_cookie(&self, name: String, secure: bool) -> PersistedCookie {
        self.build_cookie(name, String::new(), CookieExpiry::Delete, secure)
    }
}

/// Field-keyed cookie values for the user, `None` meaning "clear".
///
/// Anonymous sessions clear the ID and token cookies but leave the name
/// cookie alone, so login forms can keep prefilling the last username.
fn cookie_data_to_export(user: &SessionUser, remember: bool) -> CookieValueMap {
    let mut cookies = CookieValueMap::new();
    match user {
        SessionUser::Anonymous => {
            cookies.insert("UserID".to_string(), None);
            cookies.insert("Token".to_string(), None);
        }
        SessionUser::Identified(user) => {
            cookies.insert("UserID".to_string(), Some(user.id.to_string()));
            cookies.insert("UserName".to_string(), Some(user.name.clone()));
            // A non-persistent login must not leave a reusable credential
            // in a durable cookie.
            cookies.insert("Token".to_string(), remember.then(|| user.token.clone()));
        }
    }
    cookies
}

/// Session data mirrored for the set-cookies hook's benefit.
fn session_data_to_export(user: &UserRecord) -> SessionData {
    let mut data = SessionData::new();
    data.insert("user_id".to_string(), Value::from(user.id));
    data.insert("user_name".to_string(), Value::from(user.name.clone()));
    data.insert("token".to_string(), Value::from(user.token.clone()));
    data
}
