#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use gateway_api::config::ServerConfig;
use gateway_api::engine::dispatcher::JobDispatcher;
use gateway_api::router::build_app_router;
use gateway_api::state::AppState;
use gateway_automl::{AutoMlApi, AutoMlApiError, JobForwarder, ProcessJobRequest};
use gateway_core::job::{JobRecord, JobStatus};
use gateway_store::JobStore;

pub const VALID_CONFIG: &str =
    r#"{"metric":"accuracy","search_budget":10,"objective":"maximize"}"#;

pub const SAMPLE_CSV: &[u8] = b"age,income,label\n34,52000,1\n29,31000,0\n";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        automl_core_url: "http://127.0.0.1:8000".to_string(),
        dispatch_timeout_secs: 2,
        max_upload_bytes: 1024 * 1024,
        strict_transitions: false,
    }
}

/// Everything a test needs to drive the gateway and inspect its state.
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub store: Arc<JobStore>,
    pub dispatcher: Arc<JobDispatcher>,
}

/// Build the full application router around the given forwarder.
///
/// Uses [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app_with(forwarder: Arc<dyn JobForwarder>, config: ServerConfig) -> TestApp {
    let store = Arc::new(JobStore::with_policy(config.transition_policy()));
    let dispatcher = Arc::new(JobDispatcher::new(Arc::clone(&store), forwarder));

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
        dispatcher: Arc::clone(&dispatcher),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        dispatcher,
    }
}

/// Gateway whose worker accepts every job and never calls back.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(AcceptingForwarder), test_config())
}

/// Gateway with the strict transition policy enabled.
pub fn build_strict_test_app() -> TestApp {
    let config = ServerConfig {
        strict_transitions: true,
        ..test_config()
    };
    build_test_app_with(Arc::new(AcceptingForwarder), config)
}

// ---------------------------------------------------------------------------
// Forwarders
// ---------------------------------------------------------------------------

/// Acknowledges every job.
pub struct AcceptingForwarder;

#[async_trait]
impl JobForwarder for AcceptingForwarder {
    async fn forward(&self, _request: &ProcessJobRequest) -> Result<(), AutoMlApiError> {
        Ok(())
    }
}

/// Start a stub AutoML core on an ephemeral port.
///
/// It answers `POST /process` with `status` and pushes every accepted
/// request onto the returned channel.
pub async fn spawn_stub_worker(
    status: StatusCode,
) -> (SocketAddr, mpsc::UnboundedReceiver<ProcessJobRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new().route(
        "/process",
        post(move |Json(body): Json<ProcessJobRequest>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                status
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, rx)
}

/// Gateway wired to a real [`AutoMlApi`] client pointed at `url`.
pub fn build_test_app_for_worker(url: String) -> TestApp {
    let config = ServerConfig {
        automl_core_url: url,
        ..test_config()
    };
    let api = AutoMlApi::new(config.automl_core_url.clone(), config.dispatch_timeout()).unwrap();
    build_test_app_with(Arc::new(api), config)
}

/// A URL on which nothing is listening.
pub async fn unreachable_worker_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// One part of a multipart form: field name, optional filename, content.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, content: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content,
        }
    }
}

const BOUNDARY: &str = "gateway-test-boundary";

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Submit a valid CSV job and return its id.
pub async fn submit_valid_job(app: Router) -> String {
    let response = post_multipart(
        app,
        "/submit",
        &[
            Part::file("dataset", "data.csv", SAMPLE_CSV),
            Part::text("dataset_format", "csv"),
            Part::text("config", VALID_CONFIG),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    json["job_id"].as_str().unwrap().to_string()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the store until the job reaches `status` (5 second budget).
pub async fn wait_for_status(store: &JobStore, job_id: &str, status: JobStatus) -> JobRecord {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(job) = store.get(job_id).await {
            if job.status == status {
                return job;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} never reached {status}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn sample_results() -> serde_json::Value {
    serde_json::json!({
        "best_model": { "name": "rf" },
        "metrics": { "train_score": 0.9, "validation_score": 0.85 }
    })
}
