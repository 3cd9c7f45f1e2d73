// src/checker/http.rs
// =============================================================================
// The real network transport, built on reqwest.
//
// Key functionality:
// - HEAD requests that follow redirects
// - GET requests that read only the first chunk of the body, so a live
//   stream is never downloaded
// - Maps reqwest failures onto the two ProbeError categories (timeout vs.
//   everything else) with a readable message
//
// The transport never judges a status code. It hands back whatever the
// server answered and lets the probe strategy decide.
// =============================================================================

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use super::probe::Transport;
use crate::error::ProbeError;

/// Maximum redirects followed before giving up on a URL
const MAX_REDIRECTS: usize = 10;

/// Transport backed by a shared reqwest client.
///
/// One instance is created per engine and reused for every endpoint so that
/// connections to the same origin are pooled.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        // No client-wide timeout: every request carries its own, because the
        // Hybrid strategy gives HEAD only half of the configured budget.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("stream-guardian/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();
        trace!(url, status, "HEAD answered");
        Ok(status)
    }

    async fn get_partial(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();

        // Pull a single chunk and drop the response. Dropping closes the
        // connection instead of draining an endless stream.
        let first_chunk = response.chunk().await.map_err(categorize_error)?;
        trace!(
            url,
            status,
            bytes = first_chunk.as_ref().map_or(0, |chunk| chunk.len()),
            "GET answered"
        );

        Ok(status)
    }
}

// Categorizes the different reqwest failures
//
// Timeouts get their own variant because they are reported as "timeout".
// Everything else becomes a Transport error with a short human message.
fn categorize_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        return ProbeError::Timeout;
    }

    // Convert error to string once; the source chain holds the useful detail
    let error_string = full_error_chain(&error);
    let lowered = error_string.to_lowercase();

    let message = if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        if lowered.contains("dns") || lowered.contains("resolve") {
            "could not resolve hostname".to_string()
        } else if lowered.contains("certificate") || lowered.contains("tls") {
            "SSL certificate error".to_string()
        } else {
            "connection failed".to_string()
        }
    } else if lowered.contains("certificate") || lowered.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    ProbeError::Transport(message)
}

// reqwest's Display only says "error sending request"; the cause that tells
// DNS apart from a refused connection sits further down the source chain.
fn full_error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_head_returns_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/live.m3u8"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let status = transport
            .head(&format!("{}/live.m3u8", server.uri()), TIMEOUT)
            .await;
        assert_eq!(status, Ok(200));
    }

    #[tokio::test]
    async fn test_head_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let status = transport.head(&format!("{}/old", server.uri()), TIMEOUT).await;
        assert_eq!(status, Ok(200));
    }

    #[tokio::test]
    async fn test_get_partial_reads_body_start() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream.ts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x47u8; 64 * 1024]))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let status = transport
            .get_partial(&format!("{}/stream.ts", server.uri()), TIMEOUT)
            .await;
        assert_eq!(status, Ok(200));
    }

    #[tokio::test]
    async fn test_get_partial_stops_after_first_chunk_of_endless_stream() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // A live stream: headers and one chunk, then the body never ends
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..read]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      Content-Type: video/mp2t\r\n\
                      Transfer-Encoding: chunked\r\n\r\n\
                      10\r\nGGGGGGGGGGGGGGGG\r\n",
                )
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let transport = HttpTransport::new().unwrap();
        let started = std::time::Instant::now();
        let status = transport
            .get_partial(&format!("http://{addr}/live.ts"), TIMEOUT)
            .await;

        assert_eq!(status, Ok(200));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_non_200_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let status = transport
            .get_partial(&format!("{}/missing", server.uri()), TIMEOUT)
            .await;
        assert_eq!(status, Ok(404));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let status = transport
            .head(&server.uri(), Duration::from_millis(200))
            .await;
        assert_eq!(status, Err(ProbeError::Timeout));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        // Bind then drop a listener so the port is very likely closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new().unwrap();
        let status = transport.head(&format!("http://{addr}/"), TIMEOUT).await;
        assert!(matches!(status, Err(ProbeError::Transport(_))));
    }
}
