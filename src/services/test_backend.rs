//! Local stand-in of the backend project for the http layer tests.
//!
//! Every request is recorded and answered with the next queued reply, or a
//! 500 when none is left.

use super::backend::BackendClient;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct Recorder {
    requests: Vec<RecordedRequest>,
    replies: VecDeque<(u16, String)>,
}

type SharedRecorder = Arc<Mutex<Recorder>>;

async fn record(
    State(recorder): State<SharedRecorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let query = reqwest::Url::parse(&format!("http://backend{uri}"))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default();

    let mut recorder = recorder.lock().unwrap();
    recorder.requests.push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body: body.to_vec(),
    });

    let (status, body) = recorder
        .replies
        .pop_front()
        .unwrap_or((500, r#"{"message":"no reply queued"}"#.to_string()));

    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

pub struct TestBackend {
    pub url: String,
    recorder: SharedRecorder,
}

impl TestBackend {
    pub async fn start() -> Self {
        let recorder = SharedRecorder::default();
        let router = Router::new()
            .fallback(record)
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { url, recorder }
    }

    /// Client of this backend, using `anon` as project key
    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.url, "anon").unwrap()
    }

    pub fn reply_json(&self, status: u16, body: Value) {
        self.reply_raw(status, &body.to_string());
    }

    pub fn reply_raw(&self, status: u16, body: &str) {
        self.recorder
            .lock()
            .unwrap()
            .replies
            .push_back((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.lock().unwrap().requests.clone()
    }

    /// The single request received so far
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "requests: {requests:?}");
        requests[0].clone()
    }
}
