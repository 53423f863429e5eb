//! HTTP probe.
//!
//! One GET per call, bounded by a single timeout covering connect, TLS,
//! and response headers. Redirects are reported, never followed. Every
//! transport error is folded into `Outcome::Failure`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{ACCEPT, HOST, LOCATION, USER_AGENT};
use http::{HeaderValue, Method, Request, Response, Uri};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use upwatch_state::ProbeResult;

/// Per-probe timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT_VALUE: &str = concat!("upwatch/", env!("CARGO_PKG_VERSION"));

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can check a URL and report what happened.
///
/// Implementations must not fail: problems are reported as
/// `Outcome::Failure` inside the returned result.
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProbeResult>;
}

/// Why a probe produced no response. Rendered into `Outcome::Failure`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("tls handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("http handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),

    #[error("timeout")]
    Timeout,

    #[error("tls setup failed: {0}")]
    TlsConfig(#[from] rustls::Error),
}

/// Where and how to connect for a given URL.
#[derive(Debug, PartialEq, Eq)]
struct Endpoint {
    tls: bool,
    /// Host without IPv6 brackets, for DNS and SNI.
    host: String,
    port: u16,
    /// `Host` header value.
    authority: String,
    path: String,
}

impl Endpoint {
    fn parse(url: &str) -> Result<Self, ProbeError> {
        let uri: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| ProbeError::InvalidUrl(e.to_string()))?;

        let (tls, default_port) = match uri.scheme_str() {
            Some("http") => (false, 80),
            Some("https") => (true, 443),
            Some(other) => return Err(ProbeError::UnsupportedScheme(other.to_string())),
            None => return Err(ProbeError::InvalidUrl(format!("{url}: missing scheme"))),
        };

        let raw_host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProbeError::InvalidUrl(format!("{url}: missing host")))?;
        let host = raw_host.trim_start_matches('[').trim_end_matches(']').to_string();

        let authority = match uri.port_u16() {
            Some(port) => format!("{raw_host}:{port}"),
            None => raw_host.to_string(),
        };

        Ok(Self {
            tls,
            host,
            port: uri.port_u16().unwrap_or(default_port),
            authority,
            path: uri
                .path_and_query()
                .map(|p| p.as_str().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "/".to_string()),
        })
    }
}

/// Production prober: plain HTTP/1.1 over TCP, rustls for `https`.
#[derive(Clone)]
pub struct HttpProber {
    timeout: Duration,
    tls: TlsConnector,
}

impl HttpProber {
    /// Prober with the default 10s timeout.
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProbeError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let mut config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(Self {
            timeout,
            tls: TlsConnector::from(Arc::new(config)),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `url` once.
    pub async fn check(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.exchange(url)).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout),
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(resp) => {
                let result = response_to_result(&resp, elapsed);
                debug!(
                    %url,
                    status = resp.status().as_u16(),
                    elapsed_ms = result.elapsed_ms.unwrap_or_default(),
                    "probe completed"
                );
                result
            }
            Err(e) => {
                debug!(%url, error = %e, "probe failed");
                ProbeResult::failure(e.to_string())
            }
        }
    }

    async fn exchange(&self, url: &str) -> Result<Response<Incoming>, ProbeError> {
        let endpoint = Endpoint::parse(url)?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(endpoint.path.as_str())
            .header(HOST, endpoint.authority.as_str())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "*/*")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;

        let tcp = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(ProbeError::Connect)?;

        if endpoint.tls {
            let server_name = ServerName::try_from(endpoint.host.clone())
                .map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
            let stream = self
                .tls
                .connect(server_name, tcp)
                .await
                .map_err(ProbeError::Tls)?;
            send(stream, req, self.timeout).await
        } else {
            send(tcp, req, self.timeout).await
        }
    }
}

impl Prober for HttpProber {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProbeResult> {
        Box::pin(self.check(url))
    }
}

/// HTTP/1.1 handshake plus one request. Returns once headers arrive.
async fn send<S>(
    stream: S,
    req: Request<Empty<Bytes>>,
    timeout: Duration,
) -> Result<Response<Incoming>, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(ProbeError::Handshake)?;

    // Drive the connection in the background; bounded so a stalled peer
    // cannot pin the task after the caller gave up.
    tokio::spawn(async move {
        match tokio::time::timeout(timeout, conn).await {
            Ok(Err(e)) => debug!(error = %e, "probe connection closed with error"),
            Ok(Ok(())) | Err(_) => {}
        }
    });

    sender.send_request(req).await.map_err(ProbeError::Request)
}

fn response_to_result(resp: &Response<Incoming>, elapsed: Duration) -> ProbeResult {
    let status = resp.status();
    let reason = resp
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    let redirect_location = resp
        .headers()
        .get(LOCATION)
        .map(header_text);

    let headers = resp
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), header_text(value)))
        .collect();

    ProbeResult::success(
        status.as_u16(),
        reason,
        elapsed.as_secs_f64() * 1000.0,
        redirect_location,
        headers,
    )
}

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{StatusClass, classify};
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::net::SocketAddr;
    use upwatch_state::Outcome;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn test_router() -> Router {
        Router::new()
            .route("/ok", get(|| async { "hello" }))
            .route(
                "/redirect",
                get(|| async {
                    (
                        StatusCode::FOUND,
                        [(LOCATION, "https://example.com/new")],
                        "",
                    )
                }),
            )
            .route(
                "/moved-utf8",
                get(|| async {
                    (
                        StatusCode::MOVED_PERMANENTLY,
                        [(
                            LOCATION,
                            HeaderValue::from_bytes("https://example.com/café".as_bytes())
                                .unwrap(),
                        )],
                    )
                }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/boom", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
    }

    #[test]
    fn endpoint_parse_defaults() {
        let ep = Endpoint::parse("https://example.com").unwrap();
        assert_eq!(
            ep,
            Endpoint {
                tls: true,
                host: "example.com".to_string(),
                port: 443,
                authority: "example.com".to_string(),
                path: "/".to_string(),
            }
        );

        let ep = Endpoint::parse("http://example.com:8080/health?full=1").unwrap();
        assert!(!ep.tls);
        assert_eq!(ep.port, 8080);
        assert_eq!(ep.authority, "example.com:8080");
        assert_eq!(ep.path, "/health?full=1");
    }

    #[test]
    fn endpoint_parse_ipv6() {
        let ep = Endpoint::parse("http://[::1]:9000/x").unwrap();
        assert_eq!(ep.host, "::1");
        assert_eq!(ep.authority, "[::1]:9000");
    }

    #[test]
    fn endpoint_parse_rejects() {
        assert!(matches!(
            Endpoint::parse("ftp://example.com"),
            Err(ProbeError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            Endpoint::parse("example.com/path"),
            Err(ProbeError::InvalidUrl(_))
        ));
        assert!(matches!(
            Endpoint::parse("not a url"),
            Err(ProbeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn timeout_renders_as_timeout() {
        assert_eq!(ProbeError::Timeout.to_string(), "timeout");
    }

    #[tokio::test]
    async fn probe_200_is_ok() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::new().unwrap();

        let r = prober.check(&format!("http://{addr}/ok")).await;
        assert_eq!(
            r.outcome,
            Outcome::Success {
                status_code: 200,
                reason: "OK".to_string()
            }
        );
        assert!(r.elapsed_ms.unwrap() >= 0.0);
        assert!(r.redirect_location.is_none());
        assert!(r.headers.iter().any(|(k, _)| k == "content-type"));

        let c = classify(&r.outcome);
        assert_eq!(c.class, StatusClass::Ok);
        assert_eq!(c.label, "200");
    }

    #[tokio::test]
    async fn probe_does_not_follow_redirects() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::new().unwrap();

        let r = prober.check(&format!("http://{addr}/redirect")).await;
        assert_eq!(r.outcome.status_code(), Some(302));
        assert_eq!(r.status_text(), "302 Found");
        assert_eq!(r.redirect_location.as_deref(), Some("https://example.com/new"));

        let c = classify(&r.outcome);
        assert_eq!(c.class, StatusClass::Redirect);
        assert_eq!(c.label, "3xx");
    }

    #[tokio::test]
    async fn non_ascii_location_is_kept() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::new().unwrap();

        let r = prober.check(&format!("http://{addr}/moved-utf8")).await;
        assert_eq!(r.outcome.status_code(), Some(301));
        assert_eq!(r.redirect_location.as_deref(), Some("https://example.com/café"));
        let (_, header) = r
            .headers
            .iter()
            .find(|(k, _)| k == "location")
            .expect("location header recorded");
        assert_eq!(r.redirect_location.as_deref(), Some(header.as_str()));
    }

    #[tokio::test]
    async fn probe_reports_error_statuses() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::new().unwrap();

        let r = prober.check(&format!("http://{addr}/missing")).await;
        assert_eq!(r.status_text(), "404 Not Found");
        assert_eq!(classify(&r.outcome).class, StatusClass::ClientError);

        let r = prober.check(&format!("http://{addr}/boom")).await;
        assert_eq!(r.outcome.status_code(), Some(503));
        assert_eq!(classify(&r.outcome).class, StatusClass::ServerError);
    }

    #[tokio::test]
    async fn probe_timeout_is_failure() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::with_timeout(Duration::from_millis(200)).unwrap();

        let r = prober.check(&format!("http://{addr}/slow")).await;
        assert_eq!(
            r.outcome,
            Outcome::Failure {
                error: "timeout".to_string()
            }
        );
        assert!(r.elapsed_ms.is_none());
        let c = classify(&r.outcome);
        assert_eq!(c.class, StatusClass::Error);
        assert_eq!(c.label, "Error");
    }

    #[tokio::test]
    async fn probe_connection_refused_is_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::with_timeout(Duration::from_secs(2)).unwrap();
        let r = prober.check(&format!("http://{addr}/")).await;
        let err = r.error().expect("expected failure");
        assert!(err.starts_with("connection failed"), "got {err}");
    }

    #[tokio::test]
    async fn probe_tls_against_plain_server_is_failure() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::with_timeout(Duration::from_secs(2)).unwrap();

        let r = prober.check(&format!("https://{addr}/ok")).await;
        assert!(!r.outcome.is_success());
        assert_eq!(classify(&r.outcome).class, StatusClass::Error);
    }

    #[tokio::test]
    async fn probe_bad_url_is_failure() {
        let prober = HttpProber::new().unwrap();

        let r = prober.check("ftp://example.com").await;
        assert_eq!(r.error(), Some("unsupported scheme: ftp"));

        let r = prober.check("not a url").await;
        assert!(r.error().unwrap().starts_with("invalid url"));
    }

    #[tokio::test]
    async fn repeated_probes_agree() {
        let addr = serve(test_router()).await;
        let prober = HttpProber::new().unwrap();
        let url = format!("http://{addr}/ok");

        let first = prober.check(&url).await;
        let second = prober.probe(&url).await;
        assert_eq!(first.outcome, second.outcome);
    }
}
