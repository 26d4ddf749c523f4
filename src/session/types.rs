use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::userdb::UserRecord;

/// Lowest priority a provider may claim for its candidates.
pub const MIN_PRIORITY: i32 = 0;
/// Highest priority a provider may claim for its candidates.
pub const MAX_PRIORITY: i32 = 100;

/// The account a live session speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionUser {
    /// Nobody is logged in; identity cookies get cleared on persist.
    Anonymous,
    /// A directory-backed account.
    Identified(UserRecord),
}

impl SessionUser {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionUser::Anonymous)
    }

    /// The backing account record, if any.
    pub fn record(&self) -> Option<&UserRecord> {
        match self {
            SessionUser::Anonymous => None,
            SessionUser::Identified(user) => Some(user),
        }
    }
}

/// Identity claim carried by a [`SessionCandidate`].
///
/// `verified` is only ever `true` when the client-presented token matched
/// the directory's current token for that account in a constant-time
/// comparison, or when the claim is anonymous (there is nothing to verify).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub id: u64,
    pub name: Option<String>,
    pub verified: bool,
}

impl UserClaim {
    /// The anonymous claim: id 0, no name, nothing left to verify.
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            name: None,
            verified: true,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == 0
    }
}

/// What the resolver reconstructs from an inbound request.
///
/// A candidate is a tentative identity; an external session manager decides
/// whether to accept it and turn it into a live [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCandidate {
    /// Well-formed session ID from the session cookie, when one was present.
    pub session_id: Option<String>,
    pub user: UserClaim,
    /// Provider-configured priority, within `MIN_PRIORITY..=MAX_PRIORITY`.
    pub priority: i32,
    /// The client presented the force-HTTPS marker cookie.
    pub force_https: bool,
    /// The request carried enough state (session cookie or verified token)
    /// for the session to count as already persisted client-side.
    pub persisted: bool,
}

/// Backing key/value data of a session. The set-cookies hook may merge
/// entries into it during persist.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Field-name-keyed cookie values queued for export, before prefixing.
/// `None` clears the cookie. Ordered so emission is deterministic.
pub type CookieValueMap = BTreeMap<String, Option<String>>;

/// Live session state handed to [`CookieSessionProvider::persist`].
///
/// [`CookieSessionProvider::persist`]: crate::CookieSessionProvider::persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    pub user: SessionUser,
    /// The user asked for long-lived persistence beyond the browser session.
    pub remember_user: bool,
    /// This session requires HTTPS for all subsequent traffic.
    pub force_https: bool,
    /// Most recent explicit logout, if one happened recently.
    pub logged_out_at: Option<DateTime<Utc>>,
    pub data: SessionData,
}

/// SameSite cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Case-insensitive parse of a configured SameSite value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => Option::None,
        }
    }
}

/// When a persisted cookie expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookieExpiry {
    /// Browser-session cookie: no expiry attribute at all.
    Session,
    /// Absolute expiry instant.
    At(DateTime<Utc>),
    /// Delete immediately: empty value plus an expiry far in the past.
    Delete,
}

/// Attribute defaults applied to every cookie a provider writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    /// Prefix for the identity cookies. Not applied to the session cookie
    /// or the force-HTTPS marker.
    pub prefix: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

/// One atomic Set-Cookie instruction handed to a response sink.
///
/// Either the whole tuple is applied or none of it; there is no partial
/// cookie state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCookie {
    pub name: String,
    pub value: String,
    pub expiry: CookieExpiry,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    /// Emit the value byte-for-byte instead of percent-encoding it.
    pub raw: bool,
}
