//! Error types for WebDAV session operations.
//!
//! Every failure a download can hit is a variant of [`WebDavError`]:
//! request construction, transport, staging to disk, and the WebDAV/HTTP
//! status classification performed by [`crate::fault::check_for_error`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of an HTTP failure status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// 401 or 407.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404 or 410.
    NotFound,
    /// 405.
    MethodNotAllowed,
    /// 409.
    Conflict,
    /// 412.
    PreconditionFailed,
    /// 423, the resource is locked.
    Locked,
    /// 507.
    InsufficientStorage,
    /// Any other non-success status.
    UnexpectedStatus,
}

impl HttpErrorKind {
    /// Maps a status code to its error kind.
    ///
    /// Callers are expected to only pass non-success codes.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 407 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 | 410 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            409 => Self::Conflict,
            412 => Self::PreconditionFailed,
            423 => Self::Locked,
            507 => Self::InsufficientStorage,
            _ => Self::UnexpectedStatus,
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::Conflict => "conflict",
            Self::PreconditionFailed => "precondition failed",
            Self::Locked => "locked",
            Self::InsufficientStorage => "insufficient storage",
            Self::UnexpectedStatus => "unexpected status",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while building, sending or classifying a WebDAV request.
#[derive(Debug, Error)]
pub enum WebDavError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed from the session configuration.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// File system error while staging or persisting a download.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The account base URL cannot address WebDAV resources.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The WebDAV path could not be normalized.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The raw path as supplied.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A caller or configuration header is not a valid HTTP header.
    #[error("invalid header {name:?}")]
    InvalidHeader {
        /// The header name as supplied.
        name: String,
    },

    /// The server answered with a failure status.
    #[error("{kind} (HTTP {status}) for {url}{}", message_suffix(.message))]
    Http {
        /// Classified failure kind.
        kind: HttpErrorKind,
        /// The HTTP status code.
        status: u16,
        /// The URL of the final response.
        url: String,
        /// Server-provided fault message, when the body carried one.
        message: Option<String>,
    },

    /// A started download task was cancelled before it finished.
    #[error("download of {url} was cancelled")]
    Cancelled {
        /// The URL being downloaded.
        url: String,
    },

    /// A started download task panicked.
    #[error("download task for {url} panicked")]
    TaskPanicked {
        /// The URL being downloaded.
        url: String,
    },

    /// A download task was started outside a tokio runtime.
    #[error("no tokio runtime to start download of {url}")]
    NoRuntime {
        /// The URL that would have been downloaded.
        url: String,
    },
}

impl WebDavError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason,
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>) -> Self {
        Self::InvalidHeader { name: name.into() }
    }

    /// Creates a classified HTTP status error.
    pub fn http(url: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self::Http {
            kind: HttpErrorKind::from_status(status),
            status,
            url: url.into(),
            message,
        }
    }

    /// Returns the HTTP status when the error came from a failing response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the classified kind when the error came from a failing response.
    #[must_use]
    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            Self::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true for errors raised by the status classifier.
    #[must_use]
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Returns true for network failures and timeouts.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error does not carry. Use the constructors above.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_includes_kind_status_and_url() {
        let error = WebDavError::http("https://dav.example.com/a.txt", 404, None);
        let msg = error.to_string();
        assert_eq!(msg, "not found (HTTP 404) for https://dav.example.com/a.txt");
    }

    #[test]
    fn test_http_error_display_appends_server_message() {
        let error = WebDavError::http(
            "https://dav.example.com/a.txt",
            423,
            Some("File is locked".to_string()),
        );
        let msg = error.to_string();
        assert!(msg.starts_with("locked (HTTP 423)"), "unexpected: {msg}");
        assert!(msg.ends_with(": File is locked"), "unexpected: {msg}");
    }

    #[test]
    fn test_http_error_kind_mapping() {
        assert_eq!(HttpErrorKind::from_status(401), HttpErrorKind::Unauthorized);
        assert_eq!(HttpErrorKind::from_status(407), HttpErrorKind::Unauthorized);
        assert_eq!(HttpErrorKind::from_status(403), HttpErrorKind::Forbidden);
        assert_eq!(HttpErrorKind::from_status(410), HttpErrorKind::NotFound);
        assert_eq!(HttpErrorKind::from_status(409), HttpErrorKind::Conflict);
        assert_eq!(HttpErrorKind::from_status(507), HttpErrorKind::InsufficientStorage);
        assert_eq!(HttpErrorKind::from_status(500), HttpErrorKind::UnexpectedStatus);
        assert_eq!(HttpErrorKind::from_status(302), HttpErrorKind::UnexpectedStatus);
    }

    #[test]
    fn test_accessors_only_answer_for_http_errors() {
        let http = WebDavError::http("https://h/x", 500, None);
        assert_eq!(http.status(), Some(500));
        assert_eq!(http.http_kind(), Some(HttpErrorKind::UnexpectedStatus));
        assert!(http.is_http());
        assert!(!http.is_transport());

        let timeout = WebDavError::timeout("https://h/x");
        assert_eq!(timeout.status(), None);
        assert!(timeout.is_transport());
    }

    #[test]
    fn test_invalid_path_display() {
        let error = WebDavError::invalid_path("/../etc", "escapes the root");
        let msg = error.to_string();
        assert!(msg.contains("\"/../etc\""), "unexpected: {msg}");
        assert!(msg.contains("escapes the root"), "unexpected: {msg}");
    }
}
