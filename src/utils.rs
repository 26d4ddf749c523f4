//! Request and response adapters between the provider and whatever HTTP
//! plumbing hosts it.

use std::collections::HashMap;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use thiserror::Error;

use crate::session::types::{CookieExpiry, PersistedCookie};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UtilError {
    #[error("Cookie error: {0}")]
    Cookie(String),
}

/// Read access to the cookies a request presented.
///
/// The provider only ever looks cookies up by exact name, so anything
/// that can answer that question can serve as a request.
pub trait RequestCookies {
    fn get_cookie(&self, name: &str) -> Option<String>;
}

impl RequestCookies for HashMap<String, String> {
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl RequestCookies for HeaderMap {
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|raw| cookie_from_header_value(raw, name))
    }
}

impl RequestCookies for headers::Cookie {
    fn get_cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_cookie_value)
    }
}

fn cookie_from_header_value(raw: &str, name: &str) -> Option<String> {
    for pair in raw.split(';') {
        let parts: Vec<&str> = pair.trim().splitn(2, '=').collect();
        if parts.len() == 2 && parts[0] == name {
            return Some(decode_cookie_value(parts[1]));
        }
    }
    None
}

fn decode_cookie_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Write access to the cookies a response will carry.
pub trait ResponseCookieSink {
    /// True once the response headers are already on the wire, i.e. it is
    /// too late to set cookies.
    fn headers_sent(&self) -> bool;

    fn set_cookie(&mut self, cookie: PersistedCookie);
}

/// A sink that records cookies in memory, for tests and for callers that
/// apply them to their response type themselves.
#[derive(Debug, Default)]
pub struct MemoryResponse {
    cookies: Vec<PersistedCookie>,
    headers_sent: bool,
}

impl MemoryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A response whose headers are already out; writes are refused by the
    /// provider before they reach the sink.
    pub fn sent() -> Self {
        Self {
            cookies: Vec::new(),
            headers_sent: true,
        }
    }

    pub fn cookies(&self) -> &[PersistedCookie] {
        &self.cookies
    }

    /// Last write wins, like a browser applying Set-Cookie in order.
    pub fn cookie(&self, name: &str) -> Option<&PersistedCookie> {
        self.cookies.iter().rev().find(|cookie| cookie.name == name)
    }
}

impl ResponseCookieSink for MemoryResponse {
    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn set_cookie(&mut self, cookie: PersistedCookie) {
        self.cookies.push(cookie);
    }
}

/// A sink that appends `Set-Cookie` headers to an [`http::HeaderMap`].
#[derive(Debug)]
pub struct HeaderResponse<'a> {
    headers: &'a mut HeaderMap,
    headers_sent: bool,
}

impl<'a> HeaderResponse<'a> {
    pub fn new(headers: &'a mut HeaderMap) -> Self {
        Self {
            headers,
            headers_sent: false,
        }
    }

    pub fn sent(headers: &'a mut HeaderMap) -> Self {
        Self {
            headers,
            headers_sent: true,
        }
    }
}

impl ResponseCookieSink for HeaderResponse<'_> {
    fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn set_cookie(&mut self, cookie: PersistedCookie) {
        if let Err(err) = append_set_cookie(self.headers, &cookie) {
            tracing::error!("Failed to append Set-Cookie header: {}", err);
        }
    }
}

/// Renders a cookie as a `Set-Cookie` header value.
///
/// Values are percent-encoded unless the cookie is flagged raw. A
/// deletion renders as an empty value expiring in the past.
pub fn render_set_cookie(cookie: &PersistedCookie) -> String {
    let value = if cookie.raw {
        cookie.value.clone()
    } else {
        urlencoding::encode(&cookie.value).into_owned()
    };
    let mut rendered = format!("{}={}", cookie.name, value);
    if let Some(same_site) = cookie.same_site {
        rendered.push_str("; SameSite=");
        rendered.push_str(same_site.as_str());
    }
    if cookie.secure {
        rendered.push_str("; Secure");
    }
    if cookie.http_only {
        rendered.push_str("; HttpOnly");
    }
    if !cookie.path.is_empty() {
        rendered.push_str("; Path=");
        rendered.push_str(&cookie.path);
    }
    if let Some(domain) = &cookie.domain {
        rendered.push_str("; Domain=");
        rendered.push_str(domain);
    }
    match cookie.expiry {
        CookieExpiry::Session => {}
        CookieExpiry::At(at) => {
            rendered.push_str("; Expires=");
            rendered.push_str(&at.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
        }
        CookieExpiry::Delete => {
            rendered.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0");
        }
    }
    rendered
}

pub fn append_set_cookie(
    headers: &mut HeaderMap,
    cookie: &PersistedCookie,
) -> Result<(), UtilError> {
    let rendered = render_set_cookie(cookie);
    let value = HeaderValue::from_str(&rendered)
        .map_err(|e| UtilError::Cookie(format!("Invalid Set-Cookie value: {e}")))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use headers::{Cookie, HeaderMapExt};

    use super::*;
    use crate::session::types::SameSite;

    fn base_cookie() -> PersistedCookie {
        PersistedCookie {
            name: "sid".to_string(),
            value: "abc123".to_string(),
            expiry: CookieExpiry::Session,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: false,
            same_site: None,
            raw: false,
        }
    }

    #[test]
    fn test_render_minimal_session_cookie() {
        assert_eq!(render_set_cookie(&base_cookie()), "sid=abc123; Path=/");
    }

    #[test]
    fn test_render_full_attribute_set() {
        let cookie = PersistedCookie {
            expiry: CookieExpiry::At(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            domain: Some("example.org".to_string()),
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Lax),
            ..base_cookie()
        };
        assert_eq!(
            render_set_cookie(&cookie),
            "sid=abc123; SameSite=Lax; Secure; HttpOnly; Path=/; Domain=example.org; \
             Expires=Wed, 01 May 2024 12:00:00 GMT"
        );
    }

    #[test]
    fn test_render_deletion() {
        let cookie = PersistedCookie {
            value: String::new(),
            expiry: CookieExpiry::Delete,
            ..base_cookie()
        };
        assert_eq!(
            render_set_cookie(&cookie),
            "sid=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0"
        );
    }

    #[test]
    fn test_render_encodes_value_unless_raw() {
        let encoded = PersistedCookie {
            value: "a b/c".to_string(),
            ..base_cookie()
        };
        assert_eq!(render_set_cookie(&encoded), "sid=a%20b%2Fc; Path=/");

        let raw = PersistedCookie {
            value: "a b/c".to_string(),
            raw: true,
            ..base_cookie()
        };
        assert_eq!(render_set_cookie(&raw), "sid=a b/c; Path=/");
    }

    #[test]
    fn test_render_empty_path_omits_attribute() {
        let cookie = PersistedCookie {
            path: String::new(),
            ..base_cookie()
        };
        assert_eq!(render_set_cookie(&cookie), "sid=abc123");
    }

    /// This test checks:
    /// 1. Lookup by name inside a multi-pair Cookie header
    /// 2. Lookup across several Cookie headers
    /// 3. Percent-decoding of the stored value
    /// 4. Pairs without an equals sign are skipped
    #[test]
    fn test_header_map_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; b=Alice%20B; junk"));
        headers.append(COOKIE, HeaderValue::from_static("c=3"));

        assert_eq!(headers.get_cookie("a"), Some("1".to_string()));
        assert_eq!(headers.get_cookie("b"), Some("Alice B".to_string()));
        assert_eq!(headers.get_cookie("c"), Some("3".to_string()));
        assert_eq!(headers.get_cookie("junk"), None);
        assert_eq!(headers.get_cookie("missing"), None);
    }

    #[test]
    fn test_typed_cookie_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; b=Alice%20B"));
        let cookie: Cookie = headers.typed_get().unwrap();

        assert_eq!(cookie.get_cookie("a"), Some("1".to_string()));
        assert_eq!(cookie.get_cookie("b"), Some("Alice B".to_string()));
        assert_eq!(cookie.get_cookie("missing"), None);
    }

    #[test]
    fn test_hash_map_request_cookies() {
        let jar: HashMap<String, String> = [("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(jar.get_cookie("a"), Some("1".to_string()));
        assert_eq!(jar.get_cookie("b"), None);
    }

    #[test]
    fn test_memory_response_last_write_wins() {
        let mut response = MemoryResponse::new();
        assert!(!response.headers_sent());

        response.set_cookie(base_cookie());
        response.set_cookie(PersistedCookie {
            value: "second".to_string(),
            ..base_cookie()
        });

        assert_eq!(response.cookies().len(), 2);
        assert_eq!(response.cookie("sid").unwrap().value, "second");
        assert!(MemoryResponse::sent().headers_sent());
    }

    #[test]
    fn test_header_response_appends_set_cookie() {
        let mut headers = HeaderMap::new();
        {
            let mut response = HeaderResponse::new(&mut headers);
            assert!(!response.headers_sent());
            response.set_cookie(base_cookie());
            response.set_cookie(PersistedCookie {
                name: "other".to_string(),
                ..base_cookie()
            });
        }

        let values: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(values, ["sid=abc123; Path=/", "other=abc123; Path=/"]);
    }

    #[test]
    fn test_append_rejects_header_unsafe_names() {
        let mut headers = HeaderMap::new();
        let bad = PersistedCookie {
            name: "bad\nname".to_string(),
            ..base_cookie()
        };

        let err = append_set_cookie(&mut headers, &bad).unwrap_err();
        assert!(err.to_string().starts_with("Cookie error:"));
        assert!(headers.get(SET_COOKIE).is_none());
    }
}
