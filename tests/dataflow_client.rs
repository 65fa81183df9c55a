//! Dataflow and Cloud Storage clients against a mock Google API server.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::mock_backend::{MockBackend, MockResponse};
use dataflow_launcher::client::{
    ApiSettings, ClientError, Connector, DataflowClient, DataflowConnector, RetryPolicy,
    RetryingClient, RetryingDataflowClient, RetryingStorageClient, StorageConnector, Transient,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use dataflow_launcher::config::SecureString;

fn settings(base_url: &str) -> ApiSettings {
    ApiSettings::new(base_url, Duration::from_secs(5), Duration::from_secs(1))
        .with_token(Some(SecureString::new("test-token".to_string())))
}

fn dataflow(base_url: &str, max_attempts: u32) -> RetryingDataflowClient {
    RetryingDataflowClient::new(
        DataflowConnector::new(settings(base_url)),
        RetryPolicy::new(max_attempts, Duration::from_millis(10)),
    )
    .unwrap()
}

/// Real Dataflow connector that counts every client it builds.
#[derive(Clone)]
struct CountingConnector {
    inner: DataflowConnector,
    builds: Arc<AtomicU32>,
}

impl CountingConnector {
    fn new(base_url: &str) -> Self {
        Self {
            inner: DataflowConnector::new(settings(base_url)),
            builds: Arc::new(AtomicU32::new(0)),
        }
    }

    fn builds(&self) -> u32 {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Connector for CountingConnector {
    type Client = DataflowClient;
    type Error = ClientError;

    fn connect(&self) -> Result<DataflowClient, ClientError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.inner.connect()
    }
}

/// Drops the first connection without answering, then serves `body` once.
async fn drop_first_connection_then_serve(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (first, _) = listener.accept().await.unwrap();
        drop(first);

        let (mut second, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8192];
        let _ = second.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        second.write_all(response.as_bytes()).await.unwrap();
        let _ = second.shutdown().await;
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn get_job_sends_authorized_request() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"id":"2024-05-01_10_00_00-42","name":"wordcount","projectId":"p","location":"us-central1","currentState":"JOB_STATE_RUNNING"}"#,
    ))
    .await;

    let mut client = dataflow(&mock.base_url(), 5);
    let job = client
        .get_job("p", "us-central1", "2024-05-01_10_00_00-42")
        .await
        .unwrap();

    assert_eq!(job.name, "wordcount");
    assert_eq!(job.current_state.as_deref(), Some("JOB_STATE_RUNNING"));

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(
        requests[0].path,
        "/v1b3/projects/p/locations/us-central1/jobs/2024-05-01_10_00_00-42"
    );
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn api_errors_are_not_retried() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(404, "Job not found")).await;

    let mut client = dataflow(&mock.base_url(), 5);
    let err = client.get_job("p", "l", "missing").await.unwrap_err();

    match &err {
        ClientError::Api { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "Job not found");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert!(!err.is_transient());
    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json("not json")).await;

    let mut client = dataflow(&mock.base_url(), 5);
    let err = client.get_job("p", "l", "j").await.unwrap_err();

    assert!(matches!(err, ClientError::Decode { .. }));
    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn list_jobs_follows_page_tokens() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"jobs":[{"id":"a"},{"id":"b"}],"nextPageToken":"tok/1"}"#,
    ))
    .await;
    mock.enqueue_response(MockResponse::json(r#"{"jobs":[{"id":"c"}]}"#))
        .await;

    let mut client = dataflow(&mock.base_url(), 5);
    let jobs = client.list_jobs("p", "l").await.unwrap();

    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query, None);
    assert_eq!(requests[1].query.as_deref(), Some("pageToken=tok%2F1"));
}

#[tokio::test]
async fn list_jobs_with_no_jobs_field() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json("{}")).await;

    let mut client = dataflow(&mock.base_url(), 5);
    assert!(client.list_jobs("p", "l").await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_job_requests_cancelled_state() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"id":"j","currentState":"JOB_STATE_CANCELLING"}"#,
    ))
    .await;

    let mut client = dataflow(&mock.base_url(), 5);
    let job = client.cancel_job("p", "l", "j").await.unwrap();
    assert_eq!(job.current_state.as_deref(), Some("JOB_STATE_CANCELLING"));

    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].method, "PUT");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"requestedState": "JOB_STATE_CANCELLED"}));
}

#[tokio::test]
async fn connection_refused_is_retried_until_exhausted() {
    let base_url = format!("http://127.0.0.1:{}", common::free_port());

    let mut client = dataflow(&base_url, 3);
    let err = client.get_job("p", "l", "j").await.unwrap_err();

    assert!(matches!(err, ClientError::Transport { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn connection_refused_rebuilds_client_for_every_retry() {
    let base_url = format!("http://127.0.0.1:{}", common::free_port());
    let connector = CountingConnector::new(&base_url);
    let mut client = RetryingClient::new(
        connector.clone(),
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
    .unwrap();
    let attempts = AtomicU32::new(0);

    let err = client
        .call(|dataflow| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { dataflow.get_job("p", "l", "j").await }
        })
        .await
        .unwrap_err();

    assert_eq!(err.failure_class(), "ConnectionError");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Initial build plus one rebuild per retry.
    assert_eq!(connector.builds(), 3);
}

#[tokio::test]
async fn dropped_connection_is_retried_on_a_fresh_client() {
    let base_url =
        drop_first_connection_then_serve(r#"{"id":"j","currentState":"JOB_STATE_RUNNING"}"#)
            .await;
    let connector = CountingConnector::new(&base_url);
    let mut client = RetryingClient::new(
        connector.clone(),
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
    .unwrap();
    let attempts = AtomicU32::new(0);

    let job = client
        .call(|dataflow| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { dataflow.get_job("p", "l", "j").await }
        })
        .await
        .unwrap();

    assert_eq!(job.id, "j");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(connector.builds(), 2);
}

#[tokio::test]
async fn storage_download_returns_object_bytes() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::bytes(b"print('hello')\n")).await;

    let mut client = RetryingStorageClient::new(
        StorageConnector::new(settings(&mock.base_url())),
        RetryPolicy::default(),
    )
    .unwrap();
    let bytes = client.download("bucket", "dir/main.py").await.unwrap();

    assert_eq!(bytes, b"print('hello')\n");
    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].path, "/storage/v1/b/bucket/o/dir%2Fmain.py");
    assert_eq!(requests[0].query.as_deref(), Some("alt=media"));
}
