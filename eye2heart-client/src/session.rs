//! Authenticated session context.

use std::fmt;

/// An authenticated session with the API.
///
/// A session is obtained from [`ApiClient::login`](crate::ApiClient::login)
/// and passed explicitly to every call that needs authorization. It is never
/// kept in shared or global state by this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap an existing access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw access token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let session = Session::new("abc.def.ghi");
        assert_eq!(session.bearer(), "Bearer abc.def.ghi");
        assert_eq!(session.token(), "abc.def.ghi");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("secret-token");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }
}
