//! Response metadata returned alongside downloaded files.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HeaderMap, LAST_MODIFIED};
use url::Url;

/// Status, headers and final URL of an HTTP response.
///
/// Transports only ever produce this HTTP shape, so callers never have to
/// check what kind of response they received.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
}

impl HttpResponse {
    /// Creates a response descriptor.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url) -> Self {
        Self {
            status,
            headers,
            url,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the URL of the final response, after redirects.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns a header value as text, if present and visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Declared body length.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Declared media type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Entity tag of the downloaded representation.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.headers.get(ETAG).and_then(|v| v.to_str().ok())
    }

    /// Raw `Last-Modified` header.
    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.headers.get(LAST_MODIFIED).and_then(|v| v.to_str().ok())
    }
}

impl From<&reqwest::Response> for HttpResponse {
    fn from(response: &reqwest::Response) -> Self {
        Self::new(
            response.status(),
            response.headers().clone(),
            response.url().clone(),
        )
    }
}
