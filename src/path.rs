//! Normalized WebDAV resource paths.
//!
//! A [`WebDavPath`] is an absolute, normalized path relative to an account's
//! base URL. Paths are resolved to URLs segment by segment, so reserved
//! characters inside a component (`?`, `#`, spaces, ...) are percent-encoded
//! instead of being interpreted.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::WebDavError;

/// An absolute, normalized WebDAV path.
///
/// The root path is always a directory. Any other path is a directory when
/// it was written with a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebDavPath {
    components: Vec<String>,
    is_directory: bool,
}

impl WebDavPath {
    /// The root path (`/`).
    #[must_use]
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
            is_directory: true,
        }
    }

    /// Parses and normalizes a raw path.
    ///
    /// Empty and `.` components are dropped and `..` removes the preceding
    /// component. A leading slash is optional.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidPath`] if `..` climbs above the root or
    /// the path contains a NUL byte.
    pub fn parse(raw: &str) -> Result<Self, WebDavError> {
        if raw.contains('\0') {
            return Err(WebDavError::invalid_path(raw, "contains a NUL byte"));
        }

        let mut components: Vec<String> = Vec::new();
        for component in raw.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    if components.pop().is_none() {
                        return Err(WebDavError::invalid_path(raw, "escapes the root"));
                    }
                }
                other => components.push(other.to_string()),
            }
        }

        let is_directory = components.is_empty() || raw.ends_with('/');
        Ok(Self {
            components,
            is_directory,
        })
    }

    /// Returns the normalized components.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Returns true if this path names a collection.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Returns true for `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the final component, if any.
    #[must_use]
    pub fn last_component(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Returns the parent directory, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut components = self.components.clone();
        components.pop();
        Some(Self {
            components,
            is_directory: true,
        })
    }

    /// Appends a relative path below this one.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidPath`] if `relative` climbs above the root.
    pub fn join(&self, relative: &str) -> Result<Self, WebDavError> {
        Self::parse(&format!("{self}/{relative}"))
    }

    /// Resolves this path against a base URL.
    ///
    /// The base URL's own path is kept as a prefix; its query and fragment
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidUrl`] if `base` is not an http(s) URL
    /// that can carry a path.
    pub fn to_url(&self, base: &Url) -> Result<Url, WebDavError> {
        if !matches!(base.scheme(), "http" | "https") {
            return Err(WebDavError::invalid_url(
                base.as_str(),
                "scheme must be http or https",
            ));
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| WebDavError::invalid_url(base.as_str(), "cannot be a base"))?;
            segments.pop_if_empty();
            segments.extend(&self.components);
            if self.is_directory {
                segments.push("");
            }
        }
        Ok(url)
    }
}

impl Default for WebDavPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for WebDavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        if self.is_directory {
            f.write_str("/")?;
        }
        Ok(())
    }
}

impl FromStr for WebDavPath {
    type Err = WebDavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Anything that names a WebDAV resource.
pub trait AsWebDavPath {
    /// Converts the value into a normalized path.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidPath`] when normalization fails.
    fn to_webdav_path(&self) -> Result<WebDavPath, WebDavError>;
}

impl AsWebDavPath for WebDavPath {
    fn to_webdav_path(&self) -> Result<WebDavPath, WebDavError> {
        Ok(self.clone())
    }
}

impl AsWebDavPath for str {
    fn to_webdav_path(&self) -> Result<WebDavPath, WebDavError> {
        WebDavPath::parse(self)
    }
}

impl AsWebDavPath for String {
    fn to_webdav_path(&self) -> Result<WebDavPath, WebDavError> {
        WebDavPath::parse(self)
    }
}
