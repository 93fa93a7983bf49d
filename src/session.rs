use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

/// Header carrying the anti-forgery token on state-changing requests
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[strum(serialize = "standard mode (authentication required)")]
    Authenticated,
    #[strum(serialize = "test mode (no authentication)")]
    Unauthenticated,
}

/// Credentials captured during authentication and read by every request
#[derive(Clone)]
pub struct Session {
    mode: AuthMode,
    access_token: Option<String>,
    csrf_token: Option<String>,
}

impl Session {
    /// Session that never sends credentials
    pub fn unauthenticated() -> Self {
        Self {
            mode: AuthMode::Unauthenticated,
            access_token: None,
            csrf_token: None,
        }
    }

    pub fn authenticated(access_token: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Authenticated,
            access_token: Some(access_token.into()),
            csrf_token: None,
        }
    }

    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Headers for a request. `needs_csrf` marks state-changing calls; the
    /// CSRF header is only attached when a token was actually obtained.
    pub fn headers(&self, needs_csrf: bool) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if self.mode == AuthMode::Unauthenticated {
            return Ok(headers);
        }

        if let Some(token) = &self.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if needs_csrf {
            if let Some(csrf) = &self.csrf_token {
                let mut value = HeaderValue::from_str(csrf)?;
                value.set_sensitive(true);
                headers.insert(CSRF_HEADER, value);
            }
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_csrf_token", &self.csrf_token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_sends_no_credentials() {
        let headers = Session::unauthenticated().headers(true).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(CSRF_HEADER).is_none());
    }

    #[test]
    fn test_bearer_on_reads_csrf_only_on_writes() {
        let session = Session::authenticated("jwt-123").with_csrf_token(Some("csrf-456".into()));

        let read = session.headers(false).unwrap();
        assert_eq!(read[AUTHORIZATION], "Bearer jwt-123");
        assert!(read.get(CSRF_HEADER).is_none());

        let write = session.headers(true).unwrap();
        assert_eq!(write[AUTHORIZATION], "Bearer jwt-123");
        assert_eq!(write[CSRF_HEADER], "csrf-456");
    }

    #[test]
    fn test_missing_csrf_is_omitted() {
        let session = Session::authenticated("jwt-123").with_csrf_token(None);
        let write = session.headers(true).unwrap();
        assert!(write.get(AUTHORIZATION).is_some());
        assert!(write.get(CSRF_HEADER).is_none());
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let session = Session::authenticated("bad\ntoken");
        assert!(session.headers(false).is_err());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let session = Session::authenticated("jwt-secret");
        assert!(!format!("{session:?}").contains("jwt-secret"));
    }
}
