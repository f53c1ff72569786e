//! Transport seam: executes a request and stages its body on disk.
//!
//! The [`Transport`] trait is what the download facade talks to;
//! [`ReqwestTransport`] is the production implementation built on a shared
//! `reqwest::Client`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::watch;
use tracing::{debug, instrument};

use super::constants::{
    CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, STAGED_FILE_PREFIX, STAGED_FILE_SUFFIX,
};
use super::{DavRequest, HttpResponse};
use crate::config::SessionConfig;
use crate::error::WebDavError;
use crate::user_agent;

/// Transfer progress of a single download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Body bytes written to the staged file so far.
    pub bytes_received: u64,
    /// Expected body size, when the server declared one.
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Completed fraction in `0.0..=1.0`, when the total is known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction_completed(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_received as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Sending half of a progress channel.
pub type ProgressSender = watch::Sender<DownloadProgress>;

/// A response body written to a temporary file.
///
/// The file is removed when `file` is dropped, unless it is persisted with
/// [`TempPath::keep`].
#[derive(Debug)]
pub struct StagedDownload {
    /// Location of the staged body.
    pub file: TempPath,
    /// Response metadata.
    pub response: HttpResponse,
    /// Number of body bytes written.
    pub bytes_written: u64,
}

/// An HTTP client able to download a request's response body to a file.
///
/// Implementations must not interpret status codes: classification happens
/// in the facade. They must be safe to share across concurrent downloads.
///
/// This trait uses `async_trait` so sessions can hold an `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` and stages the full response body in a new file.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::Transport`] or [`WebDavError::Timeout`] when the
    /// exchange fails, and [`WebDavError::Io`] when staging fails.
    async fn download(
        &self,
        request: &DavRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<StagedDownload, WebDavError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Create it once and share it: the inner client pools connections.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    download_dir: PathBuf,
}

impl ReqwestTransport {
    /// Creates a transport with default timeouts, staging into the OS temp dir.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, WebDavError> {
        Self::from_config(&SessionConfig::default())
    }

    /// Creates a transport from session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::ClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &SessionConfig) -> Result<Self, WebDavError> {
        let client = build_client(
            config.connect_timeout_secs,
            config.read_timeout_secs,
            &config.user_agent(),
        )
        .map_err(|source| WebDavError::ClientBuild { source })?;
        Ok(Self {
            client,
            download_dir: config.download_dir(),
        })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
        }
    }

    /// Directory staged files are created in.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn create_staged_file(&self) -> Result<(File, TempPath), WebDavError> {
        let staged = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(STAGED_FILE_SUFFIX)
            .tempfile_in(&self.download_dir)
            .map_err(|e| WebDavError::io(self.download_dir.clone(), e))?;
        let (file, path) = staged.into_parts();
        Ok((File::from_std(file), path))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, request, progress), fields(method = %request.method(), url = %request.url()))]
    async fn download(
        &self,
        request: &DavRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<StagedDownload, WebDavError> {
        let url = request.url().as_str();

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(url, e))?;
        let metadata = HttpResponse::from(&response);
        debug!(status = metadata.status().as_u16(), "response received");

        if let Some(progress) = progress {
            progress.send_replace(DownloadProgress {
                bytes_received: 0,
                total_bytes: response.content_length(),
            });
        }

        let (mut file, path) = self.create_staged_file()?;
        // `path` deletes the staged file if streaming fails or is cancelled.
        let bytes_written = stream_to_file(&mut file, response, url, &path, progress).await?;
        debug!(path = %path.display(), bytes = bytes_written, "body staged");

        Ok(StagedDownload {
            file: path,
            response: metadata,
            bytes_written,
        })
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    progress: Option<&ProgressSender>,
) -> Result<u64, WebDavError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_reqwest_error(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| WebDavError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
        if let Some(progress) = progress {
            progress.send_modify(|p| p.bytes_received = bytes_written);
        }
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| WebDavError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

fn map_reqwest_error(url: &str, error: reqwest::Error) -> WebDavError {
    if error.is_timeout() {
        WebDavError::timeout(url)
    } else {
        WebDavError::transport(url, error)
    }
}

fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
    user_agent: &str,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .read_timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent)
        .build()
}

/// User-Agent sent when the configuration does not override it.
#[must_use]
pub fn default_user_agent() -> String {
    user_agent::default_user_agent()
}
