//! Refresh token cookie handling.
//!
//! The refresh token travels only in an `HttpOnly` cookie. It is never
//! included in a JSON response body on issuance paths.

use axum::http::header::{HeaderMap, HeaderValue, COOKIE};

/// Cookie name carrying the refresh JWT.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// `Set-Cookie` value installing a refresh token.
pub fn refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    build(token, max_age_secs, secure)
}

/// `Set-Cookie` value clearing the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> HeaderValue {
    build("", 0, secure)
}

fn build(value: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    let cookie = format!(
        "{REFRESH_COOKIE}={value}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Strict{secure_attr}"
    );
    // JWT and attribute characters are always valid in a header value.
    HeaderValue::from_str(&cookie).expect("cookie header value is valid")
}

/// Pull the refresh token out of the request's `Cookie` header, if present.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == REFRESH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_cookie_attributes() {
        let value = refresh_cookie("tok123", 604800, false);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("refresh_token=tok123;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("SameSite=Strict"));
        assert!(s.contains("Max-Age=604800"));
        assert!(!s.contains("Secure"));
    }

    #[test]
    fn secure_flag_added_in_production() {
        let value = refresh_cookie("tok123", 60, true);
        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_empties_value() {
        let value = clear_refresh_cookie(false);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("refresh_token=;"));
        assert!(s.contains("Max-Age=0"));
    }

    #[test]
    fn extracts_from_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=abc.def.ghi; other=1"),
        );
        assert_eq!(
            extract_refresh_token(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn missing_cookie_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_refresh_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(extract_refresh_token(&headers), None);
    }
}
