//! Drain sequencing against real connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use mesh_bootstrap::lifecycle::{DrainOutcome, DrainSequencer, LifecycleSignal};
use mesh_bootstrap::net::BoundedListener;
use mesh_bootstrap::server::new_server;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Health router plus `/work`, which signals `started` and then takes `delay`.
fn router_with_work(delay: Duration, started: Arc<Notify>) -> Router {
    let (router, _health) = new_server();
    router.merge(Router::new().route(
        "/work",
        get(move || {
            let started = started.clone();
            async move {
                started.notify_one();
                tokio::time::sleep(delay).await;
                "done"
            }
        }),
    ))
}

async fn start_server(
    router: Router,
    grace: Duration,
    signal: &LifecycleSignal,
) -> (SocketAddr, JoinHandle<DrainOutcome>) {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let observer = signal.observe();
    let handle = tokio::spawn(async move {
        DrainSequencer::new(grace)
            .run(BoundedListener::from_tcp(tcp, 16), router, observer)
            .await
    });
    (addr, handle)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn spawn_request(addr: SocketAddr, path: &str) -> JoinHandle<Result<(u16, String), reqwest::Error>> {
    let url = format!("http://{}{}", addr, path);
    tokio::spawn(async move {
        let response = client().get(url).send().await?;
        let status = response.status().as_u16();
        Ok((status, response.text().await?))
    })
}

#[tokio::test]
async fn serves_health_while_running() {
    let signal = LifecycleSignal::new();
    let (router, _health) = new_server();
    let (addr, server) = start_server(router, Duration::from_secs(1), &signal).await;

    let (status, body) = spawn_request(addr, "/health").await.unwrap().unwrap();
    assert_eq!(status, 200);
    assert!(body.contains("SERVING"));

    signal.trigger();
    let outcome = tokio::time::timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Clean);
}

#[tokio::test]
async fn in_flight_request_finishes_within_grace() {
    let signal = LifecycleSignal::new();
    let started = Arc::new(Notify::new());
    let router = router_with_work(Duration::from_millis(300), started.clone());
    let (addr, server) = start_server(router, Duration::from_secs(5), &signal).await;

    let request = spawn_request(addr, "/work");
    started.notified().await;

    let triggered = Instant::now();
    signal.trigger();

    let outcome = tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .expect("drain did not finish")
        .unwrap();
    assert_eq!(outcome, DrainOutcome::Clean);
    assert!(triggered.elapsed() < Duration::from_secs(2), "took {:?}", triggered.elapsed());

    let (status, body) = request.await.unwrap().unwrap();
    assert_eq!(status, 200);
    assert_eq!(body, "done");
}

#[tokio::test]
async fn stuck_request_is_forced_after_grace() {
    let signal = LifecycleSignal::new();
    let started = Arc::new(Notify::new());
    let router = router_with_work(Duration::from_secs(60), started.clone());
    let grace = Duration::from_millis(300);
    let (addr, server) = start_server(router, grace, &signal).await;

    let request = spawn_request(addr, "/work");
    started.notified().await;

    let triggered = Instant::now();
    signal.trigger();

    let outcome = tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .expect("forced stop did not return")
        .unwrap();
    let elapsed = triggered.elapsed();

    assert_eq!(outcome, DrainOutcome::Forced { aborted: 1 });
    assert!(elapsed >= grace, "returned before the grace period: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    let result = tokio::time::timeout(Duration::from_secs(2), request).await.unwrap().unwrap();
    assert!(result.is_err(), "aborted request should fail, got {result:?}");
}

#[tokio::test]
async fn listener_is_released_after_stop() {
    let signal = LifecycleSignal::new();
    let (router, _health) = new_server();
    let (addr, server) = start_server(router, Duration::from_secs(1), &signal).await;

    signal.trigger();
    tokio::time::timeout(Duration::from_secs(2), server).await.unwrap().unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
