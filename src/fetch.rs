//! HTTP fetching with a one-shot certificate fallback.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: Core trait the pipeline fetches through
//! - [`HttpFetcher`]: `reqwest` implementation with user agent and timeout
//!
//! When certificate verification fails, [`HttpFetcher`] repeats the request
//! once with verification disabled. Hosts with incomplete local trust stores
//! still get fetched; every such request is logged at `warn`. No other
//! failure is retried.

use std::error::Error;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::error::BoardError;

/// Trait for fetching a URL's body.
pub trait FetchAsync {
    /// GET `url` and return the raw response bytes.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BoardError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher that sends `user_agent` and gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Http`] if the client cannot be built.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, BoardError> {
        Ok(Self {
            client: build_client(user_agent, timeout, false)?,
            user_agent: user_agent.to_string(),
            timeout,
        })
    }

    async fn get(client: &Client, url: &str) -> Result<Vec<u8>, BoardError> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BoardError> {
        let t0 = Instant::now();
        let result = match Self::get(&self.client, url).await {
            Err(BoardError::Http(e)) if is_certificate_error(&e) => {
                warn!(error = %e, "certificate verification failed; retrying without verification");
                let insecure = build_client(&self.user_agent, self.timeout, true)?;
                Self::get(&insecure, url).await
            }
            other => other,
        };
        if let Ok(body) = &result {
            debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "fetched");
        }
        result
    }
}

fn build_client(user_agent: &str, timeout: Duration, insecure: bool) -> Result<Client, BoardError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .danger_accept_invalid_certs(insecure)
        .build()?)
}

/// Whether any error in the source chain reports a certificate problem.
pub fn is_certificate_error(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if message.contains("certificate") || message.contains("invalidcert") {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_rustls::TlsAcceptor;
    use tokio_rustls::rustls::ServerConfig;
    use tokio_rustls::rustls::crypto::ring;
    use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "ethics-board-test/0.1";

    /// HTTPS server on a loopback port with a freshly generated self-signed
    /// certificate. Returns the base URL and a count of accepted connections.
    async fn self_signed_server(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let certified =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
                .unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
        let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![certified.cert.der().clone()], key)
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    // Handshakes from verifying clients fail here.
                    let Ok(mut tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let mut request = [0u8; 4096];
                    let _ = tls.read(&mut request).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.shutdown().await;
                });
            }
        });

        (format!("https://127.0.0.1:{port}/rss/search"), connections)
    }

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn Error + 'static))
        }
    }

    #[test]
    fn test_certificate_error_found_deep_in_chain() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "client error (Connect)",
                source: Some(Box::new(Layer {
                    message: "invalid peer certificate: UnknownIssuer",
                    source: None,
                })),
            })),
        };
        assert!(is_certificate_error(&err));
    }

    #[test]
    fn test_other_errors_are_not_certificate_errors() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "connection refused",
                source: None,
            })),
        };
        assert!(!is_certificate_error(&err));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(UA, Duration::from_secs(5)).unwrap();
        let body = fetcher
            .fetch(&format!("{}/rss/search?q=ethics", server.uri()))
            .await
            .expect("fetch should succeed");
        assert_eq!(body, b"<rss/>");
    }

    #[tokio::test]
    async fn test_fetch_retries_without_verification_on_self_signed_cert() {
        let (url, connections) = self_signed_server("<rss><channel></channel></rss>").await;

        let fetcher = HttpFetcher::new(UA, Duration::from_secs(5)).unwrap();
        let body = fetcher.fetch(&url).await.expect("retry should succeed");

        assert_eq!(body, b"<rss><channel></channel></rss>");
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_other_transport_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(stream);
            }
        });

        let fetcher = HttpFetcher::new(UA, Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch(&format!("https://127.0.0.1:{port}/"))
            .await
            .unwrap_err();

        assert!(matches!(&err, BoardError::Http(e) if !is_certificate_error(e)));
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(UA, Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, BoardError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(UA, Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, BoardError::Http(ref e) if e.is_timeout()));
    }
}
