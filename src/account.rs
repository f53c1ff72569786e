//! Accounts used to address and authorize WebDAV requests.
//!
//! An account knows the server base URL and how to produce an
//! `Authorization` header. Credential material is redacted in `Debug`
//! output and header values are flagged sensitive so they never end up in
//! logs.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderValue;
use url::Url;

use crate::error::WebDavError;

/// A credential-bearing WebDAV account.
///
/// The download layer never inspects accounts beyond these two methods.
pub trait WebDavAccount: Send + Sync + fmt::Debug {
    /// Base URL every path of this account is resolved against.
    fn base_url(&self) -> &Url;

    /// Value of the `Authorization` header, or `None` for anonymous access.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidHeader`] if the credentials cannot be
    /// represented as a header value.
    fn authorization(&self) -> Result<Option<HeaderValue>, WebDavError>;
}

/// Account without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousAccount {
    base_url: Url,
}

impl AnonymousAccount {
    /// Creates an anonymous account for `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl WebDavAccount for AnonymousAccount {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorization(&self) -> Result<Option<HeaderValue>, WebDavError> {
        Ok(None)
    }
}

/// Account authenticated with HTTP Basic credentials.
#[derive(Clone)]
pub struct BasicAccount {
    base_url: Url,
    username: String,
    password: String,
}

impl BasicAccount {
    /// Creates a basic-auth account.
    #[must_use]
    pub fn new(base_url: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAccount")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl WebDavAccount for BasicAccount {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorization(&self) -> Result<Option<HeaderValue>, WebDavError> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        sensitive_header(&format!("Basic {encoded}")).map(Some)
    }
}

/// Account authenticated with a bearer token (app passwords, OAuth tokens).
#[derive(Clone)]
pub struct BearerAccount {
    base_url: Url,
    token: String,
}

impl BearerAccount {
    /// Creates a bearer-token account.
    #[must_use]
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            base_url,
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAccount")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl WebDavAccount for BearerAccount {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorization(&self) -> Result<Option<HeaderValue>, WebDavError> {
        sensitive_header(&format!("Bearer {}", self.token)).map(Some)
    }
}

fn sensitive_header(value: &str) -> Result<HeaderValue, WebDavError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| WebDavError::invalid_header(reqwest::header::AUTHORIZATION.as_str()))?;
    header.set_sensitive(true);
    Ok(header)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://dav.example.com/files/").unwrap()
    }

    #[test]
    fn test_basic_account_encodes_credentials() {
        let account = BasicAccount::new(base(), "Aladdin", "open sesame");
        let header = account.authorization().unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_bearer_account_header() {
        let account = BearerAccount::new(base(), "tok-123");
        let header = account.authorization().unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer tok-123");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_bearer_account_rejects_newline_in_token() {
        let account = BearerAccount::new(base(), "tok\nInjected: yes");
        assert!(matches!(
            account.authorization(),
            Err(WebDavError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_anonymous_account_has_no_authorization() {
        let account = AnonymousAccount::new(base());
        assert!(account.authorization().unwrap().is_none());
        assert_eq!(account.base_url().as_str(), "https://dav.example.com/files/");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let basic = format!("{:?}", BasicAccount::new(base(), "alice", "hunter2"));
        assert!(basic.contains("alice"));
        assert!(!basic.contains("hunter2"), "password leaked: {basic}");
        assert!(basic.contains("[REDACTED]"));

        let bearer = format!("{:?}", BearerAccount::new(base(), "secret-token"));
        assert!(!bearer.contains("secret-token"), "token leaked: {bearer}");
    }
}
