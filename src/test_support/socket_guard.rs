//! Mock server startup that tolerates sandboxes without loopback sockets.

use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` when binding a local socket
/// is not permitted so the calling test can return early.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => drop(listener),
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping test: cannot bind loopback socket ({error})");
            return None;
        }
        Err(error) => {
            eprintln!("skipping test: loopback socket unavailable ({error})");
            return None;
        }
    }
    Some(MockServer::start().await)
}
