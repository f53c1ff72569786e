//! Immutable request descriptions.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// A fully addressed HTTP request, ready to hand to a [`super::Transport`].
///
/// Requests are values: every `with_*` method consumes the request and
/// returns the changed copy.
#[derive(Debug, Clone)]
pub struct DavRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

/// A pure transformation applied to a request before a download task is created.
pub type RequestModifier = Box<dyn FnOnce(DavRequest) -> DavRequest + Send>;

impl DavRequest {
    /// Creates a request without headers.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Shorthand for a GET request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the per-request timeout, if one was set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Replaces the method.
    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// Replaces the target URL.
    #[must_use]
    pub fn with_url(self, url: Url) -> Self {
        Self { url, ..self }
    }

    /// Sets a header, replacing any existing values for that name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets every header of `headers`, replacing existing values per name.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        // `None` names continue the previous name's value list.
        let mut current: Option<HeaderName> = None;
        for (name, value) in headers {
            match name {
                Some(name) => {
                    self.headers.insert(name.clone(), value);
                    current = Some(name);
                }
                None => {
                    if let Some(name) = &current {
                        self.headers.append(name.clone(), value);
                    }
                }
            }
        }
        self
    }

    /// Removes a header.
    #[must_use]
    pub fn without_header(mut self, name: &HeaderName) -> Self {
        self.headers.remove(name);
        self
    }

    /// Sets a timeout covering the whole exchange of this request.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::{CACHE_CONTROL, RANGE};

    fn request() -> DavRequest {
        DavRequest::get(Url::parse("https://dav.example.com/a.txt").unwrap())
    }

    #[test]
    fn test_with_header_replaces_case_insensitively() {
        let header = HeaderName::from_bytes(b"X-Trace").unwrap();
        let lowered = HeaderName::from_bytes(b"x-trace").unwrap();
        let request = request()
            .with_header(header, HeaderValue::from_static("one"))
            .with_header(lowered, HeaderValue::from_static("two"));
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()["X-TRACE"], "two");
    }

    #[test]
    fn test_with_headers_keeps_unrelated_entries() {
        let mut extra = HeaderMap::new();
        extra.insert(RANGE, HeaderValue::from_static("bytes=0-9"));
        let request = request()
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .with_headers(extra);
        assert_eq!(request.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(request.headers()[RANGE], "bytes=0-9");
    }

    #[test]
    fn test_without_header_and_timeout() {
        let request = request()
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .without_header(&CACHE_CONTROL)
            .with_timeout(Duration::from_secs(5));
        assert!(request.headers().is_empty());
        assert_eq!(request.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(*request.method(), Method::GET);
    }
}
