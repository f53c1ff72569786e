//! Download facade: request -> transport -> classify.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Method;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::constants::MAX_FAULT_BODY_BYTES;
use super::transport::{DownloadProgress, ProgressSender, StagedDownload, Transport};
use super::{DavRequest, HttpResponse, RequestModifier, WebDavSession};
use crate::account::WebDavAccount;
use crate::error::WebDavError;
use crate::fault::check_for_error;
use crate::path::AsWebDavPath;

impl WebDavSession {
    /// Downloads the response body of `request` to a temporary file.
    ///
    /// Returns the file location and the response. The file belongs to the
    /// caller from then on: move it or delete it when done. On any error the
    /// staged file is removed and no location is returned.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged, and [`WebDavError::Http`] when
    /// the response status is not 2xx.
    #[instrument(level = "debug", skip(self, request), fields(url = %request.url()))]
    pub async fn download(
        &self,
        request: DavRequest,
    ) -> Result<(PathBuf, HttpResponse), WebDavError> {
        perform_download(self.transport.as_ref(), &request, None).await
    }

    /// Downloads `path` of `account` with an authorized GET request.
    ///
    /// Equivalent to [`authorized_request`](Self::authorized_request)
    /// followed by [`download`](Self::download).
    ///
    /// # Errors
    ///
    /// Returns request construction errors, then the same errors as
    /// [`download`](Self::download).
    #[instrument(level = "debug", skip(self, path, headers, query, account))]
    pub async fn download_from(
        &self,
        path: &(impl AsWebDavPath + ?Sized),
        headers: Option<&HashMap<String, String>>,
        query: Option<&HashMap<String, String>>,
        account: &dyn WebDavAccount,
    ) -> Result<(PathBuf, HttpResponse), WebDavError> {
        let request = self.authorized_request(Method::GET, path, query, headers, account)?;
        self.download(request).await
    }

    /// Creates a download task for `path` without starting it.
    ///
    /// `modify_request` receives the authorized GET request and returns the
    /// request the task will send. Nothing touches the network until
    /// [`DownloadTask::start`] is called.
    ///
    /// # Errors
    ///
    /// Returns request construction errors.
    pub fn download_task(
        &self,
        path: &(impl AsWebDavPath + ?Sized),
        headers: Option<&HashMap<String, String>>,
        query: Option<&HashMap<String, String>>,
        account: &dyn WebDavAccount,
        modify_request: Option<RequestModifier>,
    ) -> Result<DownloadTask, WebDavError> {
        let mut request = self.authorized_request(Method::GET, path, query, headers, account)?;
        if let Some(modify) = modify_request {
            request = modify(request);
        }
        debug!(url = %request.url(), "download task created");
        Ok(DownloadTask::new(Arc::clone(&self.transport), request))
    }
}

/// A download that has not been started yet.
#[derive(Debug)]
pub struct DownloadTask {
    transport: Arc<dyn Transport>,
    request: DavRequest,
    progress: ProgressSender,
}

impl DownloadTask {
    fn new(transport: Arc<dyn Transport>, request: DavRequest) -> Self {
        let (progress, _) = watch::channel(DownloadProgress::default());
        Self {
            transport,
            request,
            progress,
        }
    }

    /// The request this task will send.
    #[must_use]
    pub fn request(&self) -> &DavRequest {
        &self.request
    }

    /// Subscribes to progress updates. Can be called before or after start.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<DownloadProgress> {
        self.progress.subscribe()
    }

    /// Starts the download on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WebDavError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(self) -> Result<DownloadHandle, WebDavError> {
        let url = self.request.url().to_string();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Err(WebDavError::NoRuntime { url });
        };
        let progress = self.progress.subscribe();
        let Self {
            transport,
            request,
            progress: sender,
        } = self;

        debug!(url = %url, "download task started");
        let join = runtime.spawn(async move {
            perform_download(transport.as_ref(), &request, Some(&sender)).await
        });

        Ok(DownloadHandle {
            join,
            url,
            progress,
        })
    }
}

/// A started download.
#[derive(Debug)]
pub struct DownloadHandle {
    join: JoinHandle<Result<(PathBuf, HttpResponse), WebDavError>>,
    url: String,
    progress: watch::Receiver<DownloadProgress>,
}

impl DownloadHandle {
    /// Aborts the transfer. The staged file, if any, is removed.
    pub fn cancel(&self) {
        self.join.abort();
    }

    /// Returns true once the transfer completed, failed or was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Returns a progress receiver.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<DownloadProgress> {
        self.progress.clone()
    }

    /// Waits for the transfer and returns its result.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`WebDavSession::download`], plus
    /// [`WebDavError::Cancelled`] after [`cancel`](Self::cancel) and
    /// [`WebDavError::TaskPanicked`] if the transfer panicked.
    pub async fn finish(self) -> Result<(PathBuf, HttpResponse), WebDavError> {
        match self.join.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => {
                debug!(url = %self.url, "download task cancelled");
                Err(WebDavError::Cancelled { url: self.url })
            }
            Err(join_error) => {
                warn!(url = %self.url, error = %join_error, "download task panicked");
                Err(WebDavError::TaskPanicked { url: self.url })
            }
        }
    }
}

async fn perform_download(
    transport: &dyn Transport,
    request: &DavRequest,
    progress: Option<&ProgressSender>,
) -> Result<(PathBuf, HttpResponse), WebDavError> {
    let staged = transport.download(request, progress).await?;

    let fault_body = if staged.response.status().is_success() {
        None
    } else {
        read_fault_body(&staged.file).await
    };
    // On error `staged` is dropped here, which deletes the staged file.
    check_for_error(&staged.response, fault_body.as_deref())?;

    let StagedDownload {
        file,
        response,
        bytes_written,
    } = staged;
    let path = file
        .keep()
        .map_err(|e| WebDavError::io(e.path.to_path_buf(), e.error))?;

    debug!(path = %path.display(), bytes = bytes_written, status = response.status().as_u16(), "download complete");
    Ok((path, response))
}

async fn read_fault_body(path: &Path) -> Option<Vec<u8>> {
    let file = tokio::fs::File::open(path).await.ok()?;
    let mut body = Vec::new();
    file.take(MAX_FAULT_BODY_BYTES)
        .read_to_end(&mut body)
        .await
        .ok()?;
    Some(body)
}
