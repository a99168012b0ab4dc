//! Mock upstream speaking the OpenAI-compatible chat completions API.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// A chat completion request as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedCall {
    pub fn model(&self) -> Option<&str> {
        self.body["model"].as_str()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.body["messages"][0]["content"].as_str()
    }
}

/// Handle to a running mock: where it listens and what it has seen.
#[derive(Clone)]
pub struct MockHandle {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockHandle {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct MockState {
    name: String,
    error: Option<(StatusCode, String)>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Mock of an OpenAI-compatible provider. Successful responses echo the prompt back.
pub struct OpenAIMock {
    name: String,
    error: Option<(StatusCode, String)>,
}

impl OpenAIMock {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error: None,
        }
    }

    /// Answer every request with the given status and an OpenAI-style error body.
    pub fn with_error(mut self, status: u16, message: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.error = Some((status, message.to_string()));
        self
    }

    pub(crate) async fn spawn(self, shutdown: CancellationToken) -> MockHandle {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            name: self.name,
            error: self.error,
            calls: calls.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address: SocketAddr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
                .unwrap();
        });

        MockHandle {
            base_url: format!("http://{address}/v1"),
            calls,
        }
    }
}

async fn chat_completions(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let call = RecordedCall { authorization, body };
    let prompt = call.prompt().unwrap_or_default().to_string();
    let model = call.model().unwrap_or_default().to_string();

    state.calls.lock().unwrap().push(call);

    if let Some((status, message)) = &state.error {
        let body = json!({
            "error": {
                "message": message,
                "type": "server_error",
            }
        });

        return (*status, Json(body)).into_response();
    }

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1677651200,
        "model": format!("{}-{model}", state.name),
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": format!("{} says: {prompt}", state.name) },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 15, "total_tokens": 25 }
    }))
    .into_response()
}
