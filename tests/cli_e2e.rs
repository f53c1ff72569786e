//! End-to-end CLI tests for the webdav-get binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("webdav-get").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download a single resource"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("webdav-get").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("webdav-get"));
}

/// Test that missing positional arguments cause non-zero exit.
#[test]
fn test_binary_missing_args_returns_error() {
    let mut cmd = Command::cargo_bin("webdav-get").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("BASE_URL"));
}

/// Test that a user without a password variable fails before any request.
#[test]
fn test_binary_missing_password_env_fails() {
    let mut cmd = Command::cargo_bin("webdav-get").unwrap();
    cmd.args([
        "http://127.0.0.1:9/dav/",
        "a.txt",
        "--user",
        "alice",
        "--password-env",
        "WEBDAV_KIT_TEST_UNSET_PASSWORD",
    ])
    .env_remove("WEBDAV_KIT_TEST_UNSET_PASSWORD")
    .assert()
    .failure()
    .stderr(predicate::str::contains("WEBDAV_KIT_TEST_UNSET_PASSWORD"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_downloads_to_output_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/dav/docs/hello.txt"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello webdav"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("hello.txt");
    let base_url = format!("{}/dav/", mock_server.uri());
    let output_arg = output.clone();

    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::cargo_bin("webdav-get").unwrap();
        cmd.args([base_url.as_str(), "docs/hello.txt", "--user", "alice", "--no-progress"])
            .arg("--output")
            .arg(&output_arg)
            .env("WEBDAV_PASSWORD", "secret")
            .assert()
            .success();
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), b"hello webdav");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_not_found_exits_non_zero() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("missing.txt");
    let base_url = format!("{}/", mock_server.uri());
    let output_arg = output.clone();

    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::cargo_bin("webdav-get").unwrap();
        cmd.args([base_url.as_str(), "missing.txt", "--no-progress"])
            .arg("--output")
            .arg(&output_arg)
            .assert()
            .failure()
            .stderr(predicate::str::contains("404"));
    })
    .await
    .unwrap();

    assert!(!output.exists());
}
