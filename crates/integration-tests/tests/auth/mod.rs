use integration_tests::{ClientFixture, OpenAIMock, TEST_SECRET, TestServer};
use serde_json::json;

async fn server_with(fixture: ClientFixture) -> TestServer {
    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(fixture);

    builder.build("").await
}

#[tokio::test]
async fn valid_credentials() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
}

#[tokio::test]
async fn hyphenated_headers_are_accepted() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .header("client-id", "test_client")
        .header("client-secret", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
}

#[tokio::test]
async fn wrong_secret() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", "not-the-password")
        .send()
        .await;

    assert_eq!(status, 401);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": 401,
        "message": "Invalid client credentials",
        "type": "authentication_error"
      }
    }
    "#);

    assert_eq!(server.openai.as_ref().unwrap().call_count(), 0);
}

#[tokio::test]
async fn unknown_client_looks_like_wrong_secret() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("somebody_else", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["error"]["message"], "Invalid client credentials");
}

#[tokio::test]
async fn client_without_secret_never_authenticates() {
    let server = server_with(ClientFixture::new("test_client").without_secret()).await;

    for secret in [TEST_SECRET, "", "anything"] {
        let (status, _) = server
            .generate(json!({ "prompt": "Hello" }))
            .credentials("test_client", secret)
            .send()
            .await;

        assert_eq!(status, 401, "secret {secret:?} should be rejected");
    }
}

#[tokio::test]
async fn missing_credentials() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, _) = server.generate(json!({ "prompt": "Hello" })).send().await;
    assert_eq!(status, 401);

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .header("client_id", "test_client")
        .send()
        .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn endpoint_outside_allow_list() {
    let server = server_with(ClientFixture::new("test_client").endpoints(&["clients/reload"])).await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 403);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": 403,
        "message": "Client does not have permission to access endpoint: generate",
        "type": "permission_error"
      }
    }
    "#);
}

#[tokio::test]
async fn authentication_runs_before_body_validation() {
    let server = server_with(ClientFixture::new("test_client")).await;

    let (status, _) = server
        .generate(json!({ "temperature": 5 }))
        .credentials("test_client", "wrong")
        .send()
        .await;

    assert_eq!(status, 401);
}
