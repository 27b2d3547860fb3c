use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// A request as seen by the fake sidecar.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
    headers: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct SidecarState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<HashMap<(String, String), CannedResponse>>>,
}

/// In-process stand-in for the Dapr sidecar.
///
/// Records every request and answers with a canned response per
/// `(method, path)`, or an empty 204 when nothing was registered.
pub struct FakeSidecar {
    pub addr: SocketAddr,
    state: SidecarState,
}

impl FakeSidecar {
    pub async fn start() -> Self {
        let state = SidecarState::default();
        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.respond_with_headers(method, path, status, body, &[]);
    }

    pub fn respond_with_headers(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: &str,
        headers: &[(&str, &str)],
    ) {
        self.state.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(state): State<SidecarState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).unwrap())
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method.as_str().to_string(), uri.path().to_string()))
        .cloned();

    match canned {
        Some(canned) => {
            let mut headers = HeaderMap::new();
            for (key, value) in canned.headers {
                headers.insert(
                    HeaderName::from_bytes(key.as_bytes()).unwrap(),
                    HeaderValue::from_str(&value).unwrap(),
                );
            }
            (canned.status, headers, canned.body).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
