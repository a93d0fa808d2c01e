//! Live listener tests.
//!
//! Each test binds the health/redirect listener on an ephemeral port, drives
//! it with a real HTTP client (redirects disabled so the 302 itself is
//! observed) and shuts it down afterwards.
//!
//! Run with: cargo test --test listener_tests
use std::net::SocketAddr;

use playlist_launcher::http::{self, ServerError};
use playlist_launcher::routes::create_router;
use playlist_launcher::state::AppState;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const UPSTREAM: &str = "http://localhost:3000";

/// A running listener, stopped when dropped
struct TestListener {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl TestListener {
    async fn start() -> Self {
        let listener = http::bind("127.0.0.1", 0).await.expect("bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let app = create_router(AppState::with_upstream(UPSTREAM));

        let task = tokio::spawn(http::serve_with_shutdown(listener, app, async move {
            let _ = stopped.await;
        }));

        Self {
            addr,
            stop: Some(stop),
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let result = (&mut self.task).await.expect("listener task panicked");
        assert!(result.is_ok(), "listener returned {result:?}");
    }
}

impl Drop for TestListener {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_returns_200_with_body() {
    let listener = TestListener::start().await;

    let response = client().get(listener.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Application is running");

    listener.shutdown().await;
}

#[tokio::test]
async fn health_returns_200_for_post() {
    let listener = TestListener::start().await;

    let response = client()
        .post(listener.url("/health"))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    listener.shutdown().await;
}

#[tokio::test]
async fn other_paths_redirect_to_upstream() {
    let listener = TestListener::start().await;

    let response = client()
        .get(listener.url("/anything/else?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "http://localhost:3000/anything/else?x=1"
    );

    listener.shutdown().await;
}

#[tokio::test]
async fn second_bind_on_same_port_fails() {
    let listener = TestListener::start().await;

    let err = http::bind("127.0.0.1", listener.addr.port())
        .await
        .expect_err("port is already bound");
    assert!(matches!(err, ServerError::Bind { .. }));

    listener.shutdown().await;
}
