//! Session Cookie Management
//!
//! Reading and writing the cookie that carries a client's session identity.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes of the session cookie
///
/// The cookie is always `HttpOnly` with `Path=/`: the identity is never
/// readable from scripts and applies to every guarded route.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    /// `None` produces a browser-session cookie
    pub max_age_secs: Option<i64>,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: true,
            same_site: SameSite::Lax,
            max_age_secs: None,
        }
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, value),
            "HttpOnly".to_string(),
            "Path=/".to_string(),
            format!("SameSite={}", self.same_site.as_str()),
        ];

        if self.secure {
            parts.push("Secure".to_string());
        }
        if let Some(max_age) = self.max_age_secs {
            parts.push(format!("Max-Age={}", max_age));
        }

        parts.join("; ")
    }

    /// Set-Cookie header carrying `value`, `None` if it is not a valid header value
    pub fn header_value(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value)).ok()
    }

    /// Read this cookie from request headers
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.name)
    }
}

/// Extract a cookie value from headers
///
/// Every `Cookie` header is searched; empty values count as absent.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_set_cookie() {
        let cookie = SessionCookie {
            name: "throttle_session".to_string(),
            secure: true,
            same_site: SameSite::Strict,
            max_age_secs: Some(3600),
        };

        let value = cookie.build_set_cookie("abc");
        assert!(value.starts_with("throttle_session=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=3600"));
    }

    #[test]
    fn test_insecure_session_cookie() {
        let cookie = SessionCookie {
            secure: false,
            ..SessionCookie::new("s")
        };
        let value = cookie.build_set_cookie("v");
        assert!(!value.contains("Secure"));
        assert!(!value.contains("Max-Age"));
        assert!(value.contains("SameSite=Lax"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; throttle_session=abc123; empty="),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("late=1"));

        assert_eq!(
            extract_cookie(&headers, "throttle_session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "late"), Some("1".to_string()));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_uses_cookie_name() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sid=xyz"));
        assert_eq!(SessionCookie::new("sid").read(&headers), Some("xyz".to_string()));
        assert_eq!(SessionCookie::new("other").read(&headers), None);
    }
}
