//! CLI entry point for the webdav-get tool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing::{debug, info};
use webdav_kit::{
    AnonymousAccount, AsWebDavPath, BasicAccount, BearerAccount, DavRequest, DownloadProgress,
    RequestModifier, SessionConfig, WebDavAccount, WebDavSession,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let session = WebDavSession::from_config(&config).context("failed to create WebDAV session")?;
    let account = build_account(&args)?;

    let path = args
        .path
        .to_webdav_path()
        .with_context(|| format!("invalid WebDAV path {:?}", args.path))?;
    let headers: HashMap<String, String> = args.headers.iter().cloned().collect();
    let query: HashMap<String, String> = args.query.iter().cloned().collect();
    let modifier: Option<RequestModifier> = args.timeout.map(|secs| {
        Box::new(move |request: DavRequest| request.with_timeout(Duration::from_secs(secs)))
            as RequestModifier
    });

    let task = session.download_task(
        &path,
        Some(&headers),
        Some(&query),
        &*account,
        modifier,
    )?;
    info!(url = %task.request().url(), "Downloading");

    let progress_ui = (!args.quiet && !args.no_progress).then(|| spawn_progress_bar(task.progress()));
    let result = task.start()?.finish().await;
    if let Some(ui) = progress_ui {
        // The bar stops once the task drops its progress sender.
        let _ = ui.await;
    }
    let (staged, response) = result?;

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(path.last_component().unwrap_or("download"))
    });
    move_file(&staged, &output).await?;

    let bytes = tokio::fs::metadata(&output).await.map(|m| m.len()).unwrap_or(0);
    info!(
        status = response.status().as_u16(),
        bytes,
        path = %output.display(),
        "Download complete"
    );
    Ok(())
}

fn build_account(args: &Args) -> Result<Arc<dyn WebDavAccount>> {
    let base_url = args.base_url.clone();
    if let Some(user) = &args.user {
        let password = std::env::var(&args.password_env)
            .with_context(|| format!("password variable {} is not set", args.password_env))?;
        return Ok(Arc::new(BasicAccount::new(base_url, user.clone(), password)));
    }
    if let Some(token_env) = &args.token_env {
        let token = std::env::var(token_env)
            .with_context(|| format!("token variable {token_env} is not set"))?;
        return Ok(Arc::new(BearerAccount::new(base_url, token)));
    }
    Ok(Arc::new(AnonymousAccount::new(base_url)))
}

fn spawn_progress_bar(
    mut progress: watch::Receiver<DownloadProgress>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {bytes} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            if let Some(total) = current.total_bytes {
                if bar.length() != Some(total) {
                    bar.set_length(total);
                    bar.set_style(
                        ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                }
            }
            bar.set_position(current.bytes_received);
        }

        bar.finish_and_clear();
    })
}

/// Moves the staged download into place, copying across file systems.
async fn move_file(staged: &Path, output: &Path) -> Result<()> {
    if tokio::fs::rename(staged, output).await.is_ok() {
        return Ok(());
    }
    debug!(from = %staged.display(), to = %output.display(), "rename failed; copying");
    tokio::fs::copy(staged, output)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    tokio::fs::remove_file(staged)
        .await
        .with_context(|| format!("failed to remove staged file {}", staged.display()))?;
    Ok(())
}
