//! Mock server startup that tolerates sandboxes without loopback sockets.

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` when no local socket can be
/// bound so the calling test can return early.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(error) = TcpListener::bind("127.0.0.1:0") {
        eprintln!("skipping test: cannot bind loopback socket ({error})");
        return None;
    }
    Some(MockServer::start().await)
}
