#![allow(dead_code)]

//! In-process HTTP stub that plays the aggregator, the object store and the
//! vault for integration tests.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_sha256: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

pub struct StubState {
    /// Status returned for every request other than `/accounts/get`
    status: StatusCode,
    accounts: Value,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    /// Answers 200 everywhere; `/accounts/get` returns `accounts`.
    pub fn start(accounts: Value) -> Self {
        Self::start_with_status(accounts, StatusCode::OK)
    }

    pub fn start_with_status(accounts: Value, status: StatusCode) -> Self {
        let state = Arc::new(StubState {
            status,
            accounts,
            objects: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

        let app = Router::new().fallback(handle).with_state(state.clone());
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("stub server");
            });
        });

        Self { base_url, state }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Objects written by PUT, keyed by path (including any query)
    pub fn objects(&self) -> HashMap<String, Vec<u8>> {
        self.state.objects.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: header("authorization"),
        content_sha256: header("x-amz-content-sha256"),
        body: body.to_vec(),
    });

    if method == Method::POST && path == "/accounts/get" {
        let response = json!({ "accounts": state.accounts, "request_id": "stub-request" });
        return (StatusCode::OK, response.to_string());
    }

    if !state.status.is_success() {
        return (state.status, "<Error><Code>StubFailure</Code></Error>".to_string());
    }

    if method == Method::PUT {
        state.objects.lock().unwrap().insert(path, body.to_vec());
    }
    (StatusCode::OK, String::new())
}

/// Raw account in the aggregator's shape
pub fn plaid_account(id: &str, account_type: &str, subtype: &str, current: Value) -> Value {
    json!({
        "account_id": id,
        "name": format!("{} {}", account_type, subtype),
        "mask": "0001",
        "type": account_type,
        "subtype": subtype,
        "balances": { "current": current, "available": current, "limit": null }
    })
}
