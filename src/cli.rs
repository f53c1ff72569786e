//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Download a single resource from a WebDAV server.
///
/// Credentials are read from environment variables so they never appear in
/// the process list.
#[derive(Parser, Debug)]
#[command(name = "webdav-get")]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the WebDAV account (e.g. https://host/remote.php/dav/files/alice/)
    pub base_url: Url,

    /// Path of the resource, relative to the base URL
    pub path: String,

    /// Username for HTTP Basic authentication
    #[arg(short, long)]
    pub user: Option<String>,

    /// Environment variable holding the Basic auth password
    #[arg(long, default_value = "WEBDAV_PASSWORD")]
    pub password_env: String,

    /// Environment variable holding a bearer token (used when no --user is given)
    #[arg(long)]
    pub token_env: Option<String>,

    /// Extra request header, as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter, as `key=value` (repeatable)
    #[arg(short = 'Q', long = "query", value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Output file (defaults to the last path component in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Session configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overall request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub timeout: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty query key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}
