//! Session cookie store: scoped set/get/delete of the single session cookie.
//!
//! The value is an opaque bearer token issued by the identity provider. This
//! module never inspects or verifies it; verification is the guard's job.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const SESSION_COOKIE_NAME: &str = "session";

// 5 days
const SESSION_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 5;

/// Build a `HttpOnly` cookie holding the session token.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the expired cookie that removes the session from the browser.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from a request's `Cookie` header, if present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok-123", false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "session=tok-123; Path=/; HttpOnly; SameSite=Lax; Max-Age=432000"
        );
    }

    #[test]
    fn session_cookie_secure_in_production() {
        let cookie = session_cookie("tok-123", true).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn extract_finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session=tok-456; lang=en"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok-456"));
    }

    #[test]
    fn extract_ignores_missing_or_empty_cookie() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=; theme=dark"));
        assert_eq!(extract_session_token(&headers), None);
    }
}
