pub mod fixtures;
pub mod llms;

use std::{net::SocketAddr, path::Path, time::Duration};

use config::Config;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use server::ServeConfig;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use fixtures::{ClientFixture, TEST_SECRET};
pub use llms::{MockHandle, OpenAIMock, RecordedCall};

/// Test client for making HTTP requests to the test server
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request to the given path, returning Result instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    /// Create a request with the given method and path
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }
}

/// Builder for a request to an authenticated gateway endpoint.
pub struct GatewayRequest<'a> {
    test_server: &'a TestServer,
    method: reqwest::Method,
    path: String,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl<'a> GatewayRequest<'a> {
    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        let header_name = HeaderName::from_bytes(key.as_bytes()).unwrap();
        let header_value = HeaderValue::from_str(value).unwrap();
        self.headers.insert(header_name, header_value);
        self
    }

    /// Authenticate with the `client_id` and `client_secret` headers.
    pub fn credentials(self, client_id: &str, secret: &str) -> Self {
        self.header("client_id", client_id).header("client_secret", secret)
    }

    /// Send the request and return status code and JSON body
    pub async fn send(self) -> (u16, serde_json::Value) {
        let response = self.send_response().await;
        let status = response.status().as_u16();
        let body = response.json().await.unwrap();

        (status, body)
    }

    /// Send the request and return the raw response
    pub async fn send_response(self) -> reqwest::Response {
        let prefix = &self.test_server.config.server.api_prefix;

        let mut request_builder = self
            .test_server
            .client
            .request(self.method, &format!("{prefix}{}", self.path))
            .headers(self.headers);

        if let Some(body) = &self.body {
            request_builder = request_builder.json(body);
        }

        request_builder.send().await.unwrap()
    }
}

pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    /// Configuration used by this test server
    pub config: Config,
    /// Upstream mocks, by provider name
    pub openai: Option<MockHandle>,
    pub groq: Option<MockHandle>,
    clients_dir: TempDir,
    /// Cancellation tokens for upstream mocks
    test_service_tokens: Vec<CancellationToken>,
    _gateway_task_handle: tokio::task::JoinHandle<()>,
    gateway_shutdown_signal: CancellationToken,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Start a server with the given configuration, no clients and no mocks.
    pub async fn start(config: &str) -> Self {
        Self::builder().build(config).await
    }

    /// Directory the gateway reads client files from.
    pub fn clients_dir(&self) -> &Path {
        self.clients_dir.path()
    }

    /// Write (or overwrite) a client file. Takes effect after a reload.
    pub fn write_client(&self, fixture: &ClientFixture) {
        write_client(self.clients_dir.path(), fixture);
    }

    /// Delete a client file. Takes effect after a reload.
    pub fn remove_client(&self, client_id: &str) {
        std::fs::remove_file(self.clients_dir.path().join(format!("{client_id}.json"))).unwrap();
    }

    /// POST `{prefix}/generate` with the given body
    pub fn generate(&self, body: serde_json::Value) -> GatewayRequest<'_> {
        GatewayRequest {
            test_server: self,
            method: reqwest::Method::POST,
            path: "/generate".to_string(),
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }

    /// GET `{prefix}/clients/reload`
    pub fn reload_clients(&self) -> GatewayRequest<'_> {
        GatewayRequest {
            test_server: self,
            method: reqwest::Method::GET,
            path: "/clients/reload".to_string(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    async fn spawn(
        config_toml: &str,
        clients_dir: TempDir,
        openai: Option<MockHandle>,
        groq: Option<MockHandle>,
        test_service_tokens: Vec<CancellationToken>,
    ) -> Self {
        // Write config to a temporary file and use the proper loader to ensure validation
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config_toml).unwrap();

        let config = Config::load(&config_path).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let gateway_shutdown_signal = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config: config.clone(),
            shutdown_signal: gateway_shutdown_signal.clone(),
            log_filter: "server=debug,llm=debug,clients=debug,config=debug,integration_tests=debug".to_string(),
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let gateway_task_handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let result = server::serve(serve_config).await;
            let _ = tx.send(result);
        });

        let client = TestClient::new(format!("http://{address}"));

        let mut retries = 50;
        let mut last_error = None;

        while retries > 0 {
            #[allow(clippy::panic)]
            if let Ok(Err(e)) = rx.try_recv() {
                panic!("Server failed to start: {e}");
            }

            match client.try_get("/health").await {
                Ok(_) => break,
                Err(e) => last_error = Some(e),
            }

            retries -= 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        #[allow(clippy::panic)]
        if retries == 0 {
            panic!("Server failed to become ready. Last error: {last_error:?}");
        }

        TestServer {
            client,
            address,
            config,
            openai,
            groq,
            clients_dir,
            test_service_tokens,
            _gateway_task_handle: gateway_task_handle,
            gateway_shutdown_signal,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for token in &self.test_service_tokens {
            token.cancel();
        }

        self.gateway_shutdown_signal.cancel();
    }
}

#[derive(Default)]
pub struct TestServerBuilder {
    config: String,
    clients: Vec<ClientFixture>,
    openai: Option<MockHandle>,
    groq: Option<MockHandle>,
    test_service_tokens: Vec<CancellationToken>,
}

impl TestServerBuilder {
    /// Spawn a mock and point the `openai` provider at it
    pub async fn spawn_openai(&mut self, mock: OpenAIMock) -> MockHandle {
        let handle = self.spawn_mock(mock, "openai").await;
        self.openai = Some(handle.clone());
        handle
    }

    /// Spawn a mock and point the `groq` provider at it
    pub async fn spawn_groq(&mut self, mock: OpenAIMock) -> MockHandle {
        let handle = self.spawn_mock(mock, "groq").await;
        self.groq = Some(handle.clone());
        handle
    }

    /// Register a client file before the server starts
    pub fn client(&mut self, fixture: ClientFixture) -> &mut Self {
        self.clients.push(fixture);
        self
    }

    async fn spawn_mock(&mut self, mock: OpenAIMock, provider: &str) -> MockHandle {
        let token = CancellationToken::new();
        let handle = mock.spawn(token.clone()).await;

        self.test_service_tokens.push(token);

        self.config.push_str(&format!(
            "\n[llm.providers.{provider}]\napi_key = \"test-{provider}-key\"\nbase_url = {}\n",
            toml::Value::String(handle.base_url.clone())
        ));

        handle
    }

    pub async fn build(self, config: &str) -> TestServer {
        let clients_dir = tempfile::tempdir().unwrap();

        for fixture in &self.clients {
            write_client(clients_dir.path(), fixture);
        }

        let clients_dir_value = toml::Value::String(clients_dir.path().display().to_string());

        let final_config = format!(
            "{config}\n{}\n[clients]\nconfig_dir = {clients_dir_value}\n",
            self.config
        );

        TestServer::spawn(
            &final_config,
            clients_dir,
            self.openai,
            self.groq,
            self.test_service_tokens,
        )
        .await
    }
}

fn write_client(dir: &Path, fixture: &ClientFixture) {
    let path = dir.join(format!("{}.json", fixture.client_id()));
    std::fs::write(path, fixture.to_json()).unwrap();
}
