//! Single announce calls to the directory service.
//!
//! # Responsibilities
//! - Resolve the directory address into a request target
//! - Own the pooled HTTP connection to the directory
//! - Send the full registration, bounded by the per-call timeout
//! - Log and count every outcome

use std::time::Duration;

use arc_swap::ArcSwapOption;
use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

use crate::observability::metrics;
use crate::registrar::{Announce, AnnounceError, RegistrarError, RegistrationDescriptor};

/// Directory endpoint that accepts announces.
pub const REGISTER_PATH: &str = "/v1/registrations";

const USER_AGENT: &str = concat!("mesh-bootstrap/", env!("CARGO_PKG_VERSION"));

/// Directory replies carry no payload; anything larger is a misbehaving peer.
const MAX_RESPONSE_BYTES: usize = 64 * 1024;

type DirectoryClient = Client<HttpConnector, Body>;

/// Sends this instance's registration to the directory service.
///
/// The connection is dialed lazily on the first announce and reused until
/// [`HeartbeatSender::close`].
pub struct HeartbeatSender {
    descriptor: RegistrationDescriptor,
    directory: String,
    register_uri: Uri,
    payload: Bytes,
    call_timeout: Duration,
    client: ArcSwapOption<DirectoryClient>,
}

impl HeartbeatSender {
    /// Build a sender for the directory at `directory_addr` (`host:port` or
    /// `http://host:port`). Fails if the address is not dialable.
    pub fn new(
        directory_addr: &str,
        descriptor: RegistrationDescriptor,
        call_timeout: Duration,
    ) -> Result<Self, RegistrarError> {
        let register_uri = register_uri(directory_addr)?;
        let payload = descriptor.encode()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(call_timeout));
        connector.set_nodelay(true);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            descriptor,
            directory: directory_addr.trim().to_string(),
            register_uri,
            payload,
            call_timeout,
            client: ArcSwapOption::from_pointee(client),
        })
    }

    /// Send one announce. Every outcome is logged here with the service and
    /// directory, including an announce dropped before it finished; callers
    /// treat failures as "this round failed".
    pub async fn announce_once(&self) -> Result<(), AnnounceError> {
        let mut in_flight = InFlight {
            sender: self,
            finished: false,
        };
        let result = self.send().await;
        in_flight.finished = true;

        let service = self.descriptor.service_name();
        match &result {
            Ok(()) => tracing::info!(
                service,
                directory = %self.directory,
                "Registered with directory"
            ),
            Err(e) => tracing::warn!(
                service,
                directory = %self.directory,
                error = %e,
                "Announce to directory failed"
            ),
        }
        metrics::record_announce(service, result.as_ref().err());

        result
    }

    async fn send(&self) -> Result<(), AnnounceError> {
        let client = self.client.load_full().ok_or(AnnounceError::Closed)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.register_uri.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::from(self.payload.clone()))
            .map_err(|e| AnnounceError::Transport(e.to_string()))?;

        let exchange = async {
            let response = client
                .request(request)
                .await
                .map_err(|e| AnnounceError::Transport(error_chain(&e)))?;
            let status = response.status();

            // Read to the end so the connection goes back to the pool.
            axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
                .await
                .map_err(|e| AnnounceError::Transport(error_chain(&e)))?;

            if status.is_success() {
                Ok(())
            } else {
                Err(AnnounceError::Rejected {
                    status: status.as_u16(),
                })
            }
        };

        match time::timeout(self.call_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(AnnounceError::Timeout(self.call_timeout)),
        }
    }

    /// Release the directory connection. Safe to call any number of times.
    pub fn close(&self) {
        if self.client.swap(None).is_some() {
            tracing::info!(
                service = self.descriptor.service_name(),
                directory = %self.directory,
                "Released directory connection"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.load().is_none()
    }

    pub fn descriptor(&self) -> &RegistrationDescriptor {
        &self.descriptor
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }
}

impl Announce for HeartbeatSender {
    fn announce_once(&self) -> impl std::future::Future<Output = Result<(), AnnounceError>> + Send {
        HeartbeatSender::announce_once(self)
    }
}

impl std::fmt::Debug for HeartbeatSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatSender")
            .field("service", &self.descriptor.service_name())
            .field("directory", &self.directory)
            .field("call_timeout", &self.call_timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Logs and counts an announce whose future was dropped before completing,
/// e.g. when shutdown interrupts the heartbeat mid-call.
struct InFlight<'a> {
    sender: &'a HeartbeatSender,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let service = self.sender.descriptor.service_name();
        tracing::warn!(
            service,
            directory = %self.sender.directory,
            "Announce to directory interrupted"
        );
        metrics::record_announce_interrupted(service);
    }
}

/// Turn a directory address into the announce endpoint URI.
fn register_uri(directory_addr: &str) -> Result<Uri, RegistrarError> {
    let addr = directory_addr.trim();
    if addr.is_empty() {
        return Err(RegistrarError::address(directory_addr, "empty address"));
    }

    let raw = if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    };

    let mut url = Url::parse(&raw).map_err(|e| RegistrarError::address(directory_addr, e.to_string()))?;
    if url.scheme() != "http" {
        return Err(RegistrarError::address(
            directory_addr,
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RegistrarError::address(directory_addr, "missing host"));
    }

    url.set_path(REGISTER_PATH);
    url.set_query(None);
    url.set_fragment(None);

    url.as_str()
        .parse::<Uri>()
        .map_err(|e| RegistrarError::address(directory_addr, e.to_string()))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
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

    fn descriptor() -> RegistrationDescriptor {
        RegistrationDescriptor::new("testsvc", "localhost:9001").produces(["test.event"])
    }

    #[test]
    fn accepts_host_port_and_http_urls() {
        let uri = register_uri("localhost:50000").unwrap();
        assert_eq!(uri.to_string(), "http://localhost:50000/v1/registrations");

        let uri = register_uri("http://10.1.2.3:8080/ignored?x=1").unwrap();
        assert_eq!(uri.to_string(), "http://10.1.2.3:8080/v1/registrations");

        let uri = register_uri("  directory  ").unwrap();
        assert_eq!(uri.host(), Some("directory"));
    }

    #[test]
    fn rejects_undialable_addresses() {
        for bad in ["", "   ", ":9002", "localhost:notaport", "https://dir:443", "dns:///dir:80"] {
            let err = register_uri(bad).unwrap_err();
            assert!(
                matches!(err, RegistrarError::Address { .. }),
                "{bad:?} should be an address error"
            );
        }
    }

    #[tokio::test]
    async fn new_does_not_dial() {
        // Nothing listens here; construction must still succeed.
        let sender = HeartbeatSender::new("127.0.0.1:1", descriptor(), Duration::from_secs(1)).unwrap();
        assert!(!sender.is_closed());
        assert_eq!(sender.directory(), "127.0.0.1:1");
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let sender = HeartbeatSender::new("localhost:50001", descriptor(), Duration::from_secs(1)).unwrap();
        sender.close();
        assert!(sender.is_closed());
        sender.close();
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn announce_after_close_fails_softly() {
        let sender = HeartbeatSender::new("localhost:50002", descriptor(), Duration::from_millis(50)).unwrap();
        sender.close();
        let err = sender.announce_once().await.unwrap_err();
        assert!(matches!(err, AnnounceError::Closed));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn unreachable_directory_is_a_transport_failure() {
        let tcp = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = tcp.local_addr().unwrap();
        drop(tcp);

        let sender = HeartbeatSender::new(&addr.to_string(), descriptor(), Duration::from_secs(2)).unwrap();
        let err = sender.announce_once().await.unwrap_err();
        assert!(matches!(err, AnnounceError::Transport(_)), "got {err:?}");
        assert!(logs_contain("Announce to directory failed"));
        assert!(logs_contain(&addr.to_string()));
        assert!(!logs_contain("Announce to directory interrupted"));
    }
}
