use indoc::indoc;
use integration_tests::{ClientFixture, OpenAIMock, TEST_SECRET, TestServer};
use serde_json::json;

#[tokio::test]
async fn health() {
    let server = TestServer::start("").await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "status": "ok"
    }
    "#);
}

#[tokio::test]
async fn welcome_uses_project_name() {
    let config = indoc! {r#"
        [server]
        project_name = "Test Gateway"
    "#};

    let server = TestServer::start(config).await;

    let body: serde_json::Value = server.client.get("/").await.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "docs_url": "/docs",
      "message": "Welcome to the Test Gateway",
      "redoc_url": "/redoc"
    }
    "#);
}

#[tokio::test]
async fn custom_api_prefix() {
    let config = indoc! {r#"
        [server]
        api_prefix = "/gateway/v2"
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client"));

    let server = builder.build(config).await;

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);

    let response = server
        .client
        .request(reqwest::Method::POST, "/api/v1/generate")
        .header("client_id", "test_client")
        .header("client_secret", TEST_SECRET)
        .json(&json!({ "prompt": "Hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn debug_headers() {
    let config = indoc! {r#"
        [server]
        debug_requests = true
    "#};

    let server = TestServer::start(config).await;

    let response = server.client.get("/health").await;

    assert!(response.headers().contains_key("x-request-id"));

    let process_time = response.headers()["x-process-time"].to_str().unwrap();
    assert!(process_time.parse::<f64>().is_ok());
}

#[tokio::test]
async fn cors_preflight() {
    let server = TestServer::start("").await;

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, "/api/v1/generate")
        .header("origin", "https://example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "client_id,client_secret,content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn cors_disabled() {
    let config = indoc! {r#"
        [server.cors]
        enabled = false
    "#};

    let server = TestServer::start(config).await;

    let response = server
        .client
        .request(reqwest::Method::GET, "/health")
        .header("origin", "https://example.com")
        .send()
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
