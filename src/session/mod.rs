//! WebDAV session: authorized request construction and file downloads.
//!
//! A [`WebDavSession`] pairs a shared [`Transport`] with session-wide
//! default headers. It holds no mutable state, so one session can serve
//! any number of concurrent downloads for any number of accounts.
//!
//! # Example
//!
//! ```no_run
//! use webdav_kit::{BasicAccount, WebDavSession};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = WebDavSession::new()?;
//! let account = BasicAccount::new(
//!     Url::parse("https://cloud.example.com/remote.php/dav/files/alice/")?,
//!     "alice",
//!     "app-password",
//! );
//! let (file, response) = session
//!     .download_from("Documents/report.pdf", None, None, &account)
//!     .await?;
//! println!("{} -> {}", response.status(), file.display());
//! # Ok(())
//! # }
//! ```

pub(crate) mod constants;
mod download;
mod request;
mod response;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::account::WebDavAccount;
use crate::config::SessionConfig;
use crate::error::WebDavError;
use crate::path::AsWebDavPath;

pub use download::{DownloadHandle, DownloadTask};
pub use request::{DavRequest, RequestModifier};
pub use response::HttpResponse;
pub use transport::{
    DownloadProgress, ProgressSender, ReqwestTransport, StagedDownload, Transport,
    default_user_agent,
};

/// Entry point for WebDAV downloads.
#[derive(Debug, Clone)]
pub struct WebDavSession {
    transport: Arc<dyn Transport>,
    default_headers: HeaderMap,
}

impl WebDavSession {
    /// Creates a session with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, WebDavError> {
        Self::from_config(&SessionConfig::default())
    }

    /// Creates a session backed by a [`ReqwestTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::ClientBuild`] if the HTTP client cannot be built
    /// and [`WebDavError::InvalidHeader`] for invalid default headers.
    pub fn from_config(config: &SessionConfig) -> Result<Self, WebDavError> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self {
            transport: Arc::new(transport),
            default_headers: config.default_header_map()?,
        })
    }

    /// Creates a session on top of any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            default_headers: HeaderMap::new(),
        }
    }

    /// Replaces the session default headers.
    #[must_use]
    pub fn with_default_headers(self, default_headers: HeaderMap) -> Self {
        Self {
            default_headers,
            ..self
        }
    }

    /// Returns the shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Builds an authorized request for `path` on `account`.
    ///
    /// - The URL is the account base URL with the normalized path appended.
    /// - Query pairs are appended in key order.
    /// - Headers are layered: session defaults, then `headers`, then the
    ///   account's `Authorization`, each layer replacing same-named entries.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::InvalidPath`], [`WebDavError::InvalidUrl`] or
    /// [`WebDavError::InvalidHeader`] when the inputs cannot form a request.
    pub fn authorized_request(
        &self,
        method: Method,
        path: &(impl AsWebDavPath + ?Sized),
        query: Option<&HashMap<String, String>>,
        headers: Option<&HashMap<String, String>>,
        account: &dyn WebDavAccount,
    ) -> Result<DavRequest, WebDavError> {
        let path = path.to_webdav_path()?;
        let mut url = path.to_url(account.base_url())?;

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let mut pairs: Vec<(&String, &String)> = query.iter().collect();
            pairs.sort();
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut request = DavRequest::new(method, url).with_headers(self.default_headers.clone());
        if let Some(headers) = headers {
            let caller_headers =
                parse_headers(headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
            request = request.with_headers(caller_headers);
        }
        if let Some(authorization) = account.authorization()? {
            request = request.with_header(AUTHORIZATION, authorization);
        }

        debug!(method = %request.method(), url = %request.url(), %path, "built authorized request");
        Ok(request)
    }
}

/// Converts textual header pairs into a header map.
///
/// Names are case-insensitive; a later pair replaces an earlier one with the
/// same name.
pub(crate) fn parse_headers<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<HeaderMap, WebDavError> {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| WebDavError::invalid_header(name))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| WebDavError::invalid_header(name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
