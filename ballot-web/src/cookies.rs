//! Cookie header plumbing
//!
//! The service uses two cookies: the opaque login session token and the
//! voted-questions list. Both are written and read here so the handlers deal
//! only in values; no cookie attributes leak past this module.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Login session cookie name
pub const SESSION_COOKIE: &str = "ballot_session";

/// Voted-questions cookie name
pub const VOTED_COOKIE: &str = "voted_questions";

/// Read a cookie value from the request headers
///
/// Scans every `Cookie` header; first match wins. Returns the raw value,
/// which may be empty.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Format a Set-Cookie value
///
/// HttpOnly keeps the session token away from scripts; SameSite=Lax matches
/// how the cookies are actually used (same-origin API calls).
pub fn set_cookie(name: &str, value: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_seconds
    )
}

/// Format a Set-Cookie value that removes the cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_several() {
        let headers = headers_with_cookie("a=1; ballot_session=tok-123; b=2");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("tok-123"));
        assert_eq!(cookie_value(&headers, "a"), Some("1"));
        assert_eq!(cookie_value(&headers, "b"), Some("2"));
    }

    #[test]
    fn missing_cookie_is_none() {
        let headers = headers_with_cookie("a=1");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);

        let empty = HeaderMap::new();
        assert_eq!(cookie_value(&empty, SESSION_COOKIE), None);
    }

    #[test]
    fn value_may_contain_equals_and_commas() {
        // The voted-questions value embeds commas; they are not separators
        // in the Cookie header
        let headers = headers_with_cookie("voted_questions=3,7,12; x=a=b");
        assert_eq!(cookie_value(&headers, VOTED_COOKIE), Some("3,7,12"));
        assert_eq!(cookie_value(&headers, "x"), Some("a=b"));
    }

    #[test]
    fn empty_value_is_some_empty() {
        let headers = headers_with_cookie("voted_questions=; a=1");
        assert_eq!(cookie_value(&headers, VOTED_COOKIE), Some(""));
    }

    #[test]
    fn scans_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("ballot_session=tok-456"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("tok-456"));
    }

    #[test]
    fn set_cookie_carries_attributes() {
        let header = set_cookie(SESSION_COOKIE, "tok-123", 31536000);
        assert_eq!(
            header,
            "ballot_session=tok-123; Path=/; HttpOnly; SameSite=Lax; Max-Age=31536000"
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let header = clear_cookie(SESSION_COOKIE);
        assert!(header.starts_with("ballot_session=;"));
        assert!(header.ends_with("Max-Age=0"));
    }
}
