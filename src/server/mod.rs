// Server module
// Listener setup, accept loop and signal handling

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_reusable_listener;
pub use signal::{start_signal_handler, SignalHandler};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::AppState;
use crate::logger;
use connection::accept_connection;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Accept connections until shutdown is requested, then drain
///
/// Must run inside a `LocalSet`. After shutdown the listener is closed, every
/// open connection finishes the response it is working on, and the call
/// returns once none are left or `performance.request_timeout` has passed.
pub async fn serve(listener: TcpListener, state: Arc<AppState>, signals: Arc<SignalHandler>) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (drain_tx, drain_rx) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => match accept_result {
                Ok((stream, peer_addr)) => {
                    accept_connection(stream, peer_addr, &state, &active_connections, &drain_rx);
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },

            () = signals.shutdown.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    drop(listener);
    drain_tx.send_replace(true);

    let grace = Duration::from_secs(state.config.performance.request_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    })
    .await;

    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {} seconds, closing them",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetFetcher, AssetRequest, AssetResponse, MemoryAssets};
    use crate::config::Config;
    use crate::error::Result;
    use async_trait::async_trait;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    /// Answers every lookup after a delay
    struct SlowAssets(Duration);

    #[async_trait]
    impl AssetFetcher for SlowAssets {
        async fn fetch(&self, _req: &AssetRequest) -> Result<AssetResponse> {
            tokio::time::sleep(self.0).await;
            Ok(AssetResponse::new(Full::new(Bytes::from_static(b"slow body"))))
        }
    }

    async fn raw_request(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request =
            format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_end_to_end_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::default();
                config.logging.access_log = false;
                let store = MemoryAssets::new()
                    .with_file("/index.html", "<div id=root></div>")
                    .with_file("/logo.svg", "<svg/>");
                let state = Arc::new(AppState::new(&config, Arc::new(store)));

                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(serve(listener, state, Arc::clone(&signals)));

                let api = raw_request(addr, "POST", "/api/users").await;
                assert!(api.starts_with("HTTP/1.1 200 OK"), "{api}");
                assert!(api.ends_with("API endpoint"));

                let asset = raw_request(addr, "GET", "/logo.svg").await;
                assert!(asset.starts_with("HTTP/1.1 200 OK"), "{asset}");
                assert!(asset.to_ascii_lowercase().contains("content-type: image/svg+xml"));
                assert!(asset.ends_with("<svg/>"));

                let route = raw_request(addr, "GET", "/dashboard/settings").await;
                let lower = route.to_ascii_lowercase();
                assert!(route.starts_with("HTTP/1.1 200 OK"), "{route}");
                assert!(lower.contains("content-type: text/html\r\n"));
                assert!(lower.contains("cache-control: no-cache\r\n"));
                assert!(route.ends_with("<div id=root></div>"));

                signals.request_shutdown();
                server.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_missing_everything_is_404_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::default();
                config.logging.access_log = false;
                let state = Arc::new(AppState::new(&config, Arc::new(MemoryAssets::new())));

                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(serve(listener, state, Arc::clone(&signals)));

                let resp = raw_request(addr, "GET", "/unknown").await;
                assert!(resp.starts_with("HTTP/1.1 404 Not Found"), "{resp}");
                assert!(resp.ends_with("\r\n\r\nNot Found"));

                signals.request_shutdown();
                server.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_shutdown_lets_in_flight_request_finish() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::default();
                config.logging.access_log = false;
                let store = SlowAssets(Duration::from_millis(500));
                let state = Arc::new(AppState::new(&config, Arc::new(store)));

                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(serve(listener, state, Arc::clone(&signals)));

                let client = tokio::task::spawn_local(raw_request(addr, "GET", "/slow"));
                tokio::time::sleep(Duration::from_millis(100)).await;
                signals.request_shutdown();

                let resp = client.await.unwrap();
                assert!(resp.starts_with("HTTP/1.1 200 OK"), "{resp}");
                assert!(resp.ends_with("slow body"));

                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .unwrap()
                    .unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_hold_shutdown() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::default();
                config.logging.access_log = false;
                let state = Arc::new(AppState::new(&config, Arc::new(MemoryAssets::new())));

                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(serve(listener, state, Arc::clone(&signals)));

                // One request on a keep-alive connection, then leave it idle
                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /missing HTTP/1.1\r\nHost: localhost\r\n\r\n")
                    .await
                    .unwrap();
                let mut received = Vec::new();
                let mut buf = [0u8; 1024];
                while !received.ends_with(b"\r\n\r\nNot Found") {
                    let n = stream.read(&mut buf).await.unwrap();
                    assert!(n > 0, "connection closed before the response");
                    received.extend_from_slice(&buf[..n]);
                }

                signals.request_shutdown();

                // Well under the 30 second request timeout
                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
            })
            .await;
    }
}
