//! WebDAV Kit
//!
//! The download layer of a WebDAV client: build authorized requests for
//! WebDAV paths, stream response bodies into caller-owned temporary files,
//! and create deferred download tasks.
//!
//! # Architecture
//!
//! - [`session`] - the [`WebDavSession`] facade, request/response types and the transport seam
//! - [`account`] - credential-bearing accounts
//! - [`path`] - normalized WebDAV paths
//! - [`fault`] - response classification
//! - [`config`] - session configuration
//! - [`error`] - error types

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod account;
pub mod config;
pub mod error;
pub mod fault;
pub mod path;
pub mod session;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use account::{AnonymousAccount, BasicAccount, BearerAccount, WebDavAccount};
pub use config::{ConfigError, SessionConfig};
pub use error::{HttpErrorKind, WebDavError};
pub use fault::check_for_error;
pub use path::{AsWebDavPath, WebDavPath};
pub use session::{
    DavRequest, DownloadHandle, DownloadProgress, DownloadTask, HttpResponse, ReqwestTransport,
    RequestModifier, StagedDownload, Transport, WebDavSession,
};
