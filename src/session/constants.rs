//! Constants for the session module (timeouts, staging).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Prefix of staged download files.
pub const STAGED_FILE_PREFIX: &str = "webdav-";

/// Suffix of staged download files.
pub const STAGED_FILE_SUFFIX: &str = ".download";

/// Upper bound of an error body read back for fault classification (64 KiB).
pub const MAX_FAULT_BODY_BYTES: u64 = 64 * 1024;
