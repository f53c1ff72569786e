//! Default User-Agent string for WebDAV traffic.

/// Default User-Agent for session requests (identifies the library and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    format!("webdav-kit/{}", env!("CARGO_PKG_VERSION"))
}
