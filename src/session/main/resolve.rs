use subtle::ConstantTimeEq;

use crate::session::types::{SessionCandidate, UserClaim};
use crate::utils::RequestCookies;

use super::FORCE_HTTPS_COOKIE;
use super::provider::CookieSessionProvider;

impl CookieSessionProvider {
    /// Reconstructs a session candidate from the request's cookies, or
    /// returns `None` when this mechanism cannot authenticate the request.
    ///
    /// Malformed cookies are rejected silently; mismatched credentials are
    /// rejected with a single warning. Rejection is never an error: an
    /// absent candidate means "no opinion", not a failed request.
    #[tracing::instrument(skip_all)]
    pub fn resolve(&self, request: &impl RequestCookies) -> Option<SessionCandidate> {
        let session_id = self
            .cookie(request, self.session_cookie_name())
            .filter(|id| is_valid_session_id(id));
        let force_https = self.cookie(request, FORCE_HTTPS_COOKIE).is_some();

        let user_id = self.cookie(request, &self.cookie_name("UserID"));
        let user_name = self.cookie(request, &self.cookie_name("UserName"));
        let token = self.cookie(request, &self.cookie_name("Token"));

        let (user, token_verified) = match user_id {
            Some(raw_id) => {
                let id = parse_user_id(&raw_id)?;
                let user = self.users.find_user_by_id(id)?;
                match token {
                    Some(token) => {
                        if !constant_time_eq(&user.token, &token) {
                            tracing::warn!(
                                "Session \"{}\" requested with invalid token cookie",
                                session_id.as_deref().unwrap_or_default()
                            );
                            return None;
                        }
                        (
                            UserClaim {
                                id,
                                name: Some(user.name),
                                verified: true,
                            },
                            true,
                        )
                    }
                    None => {
                        if let Some(name) = &user_name {
                            if *name != user.name {
                                tracing::warn!(
                                    "Session \"{}\" requested with mismatched user ID and user name cookies",
                                    session_id.as_deref().unwrap_or_default()
                                );
                                return None;
                            }
                        }
                        if session_id.is_none() {
                            // An unverified claim with no session to attach
                            // to is useless downstream.
                            return None;
                        }
                        (
                            UserClaim {
                                id,
                                name: Some(user.name),
                                verified: false,
                            },
                            false,
                        )
                    }
                }
            }
            None => match &session_id {
                Some(id) => {
                    tracing::debug!("Session \"{}\" requested without user ID cookie", id);
                    (UserClaim::anonymous(), false)
                }
                None => return None,
            },
        };

        let persisted = session_id.is_some() || token_verified;
        Some(SessionCandidate {
            session_id,
            user,
            priority: self.priority,
            force_https,
            persisted,
        })
    }
}

/// Shape of an acceptable session ID: at least 32 characters drawn from
/// ASCII alphanumerics, comma and hyphen.
fn is_valid_session_id(id: &str) -> bool {
    id.len() >= 32
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b',' || b == b'-')
}

/// Account IDs are strictly positive decimal integers; anything else is
/// treated as cookie corruption.
fn parse_user_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().filter(|id| *id > 0)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
