use integration_tests::{ClientFixture, OpenAIMock, TEST_SECRET, TestServer};
use serde_json::json;

#[tokio::test]
async fn uses_client_defaults() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client").default_model("gpt-4o-mini"));

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({ "prompt": "Tell me a joke" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
    insta::assert_json_snapshot!(body, @r#"
    {
      "model": "gpt-4o-mini",
      "text": "openai says: Tell me a joke",
      "usage": {
        "completion_tokens": 15,
        "prompt_tokens": 10,
        "total_tokens": 25
      }
    }
    "#);

    let calls = openai.calls();
    assert_eq!(calls.len(), 1);

    insta::assert_json_snapshot!(calls[0].body, @r#"
    {
      "max_tokens": 150,
      "messages": [
        {
          "content": "Tell me a joke",
          "role": "user"
        }
      ],
      "model": "gpt-4o-mini",
      "temperature": 0.7
    }
    "#);
}

#[tokio::test]
async fn explicit_provider_and_model() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    let groq = builder.spawn_groq(OpenAIMock::new("groq")).await;
    builder.client(ClientFixture::new("test_client").providers(&["openai", "groq"]));

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({
            "prompt": "Hello",
            "provider": "groq",
            "model": "llama3-8b-8192",
            "temperature": 0.1,
            "max_tokens": 64
        }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["model"], "llama3-8b-8192");
    assert_eq!(body["text"], "groq says: Hello");

    assert_eq!(openai.call_count(), 0);

    let calls = groq.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model(), Some("llama3-8b-8192"));
    assert_eq!(calls[0].body["max_tokens"], 64);
}

#[tokio::test]
async fn provider_outside_allow_list() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    let groq = builder.spawn_groq(OpenAIMock::new("groq")).await;
    builder.client(ClientFixture::new("test_client").providers(&["openai"]));

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello", "provider": "groq" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 403);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": 403,
        "message": "Client does not have permission to use provider: groq",
        "type": "permission_error"
      }
    }
    "#);

    assert_eq!(openai.call_count(), 0);
    assert_eq!(groq.call_count(), 0);
}

#[tokio::test]
async fn max_tokens_above_limit() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client").max_tokens_limit(2000));

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello", "max_tokens": 3000 }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 400);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": 400,
        "message": "Max tokens limit exceeded. Maximum allowed: 2000",
        "type": "invalid_request_error"
      }
    }
    "#);

    assert_eq!(openai.call_count(), 0);
}

#[tokio::test]
async fn limit_is_checked_before_provider_permission() {
    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client").providers(&["openai"]));

    let server = builder.build("").await;

    let (status, _) = server
        .generate(json!({ "prompt": "Hello", "max_tokens": 3000, "provider": "groq" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 400);
}

#[tokio::test]
async fn allowed_provider_disabled_on_gateway() {
    let config = indoc::indoc! {r#"
        [llm]
        default_provider = "openai"

        [llm.providers.groq]
        enabled = false
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client").providers(&["openai", "groq"]));

    let server = builder.build(config).await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello", "provider": "groq" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Invalid provider: groq");
}

#[tokio::test]
async fn upstream_failure() {
    let mut builder = TestServer::builder();
    let openai = builder
        .spawn_openai(OpenAIMock::new("openai").with_error(503, "model overloaded"))
        .await;
    builder.client(ClientFixture::new("test_client"));

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 500);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "code": 500,
        "message": "Error generating text: openai API error (503): model overloaded",
        "type": "api_error"
      }
    }
    "#);

    // No retries.
    assert_eq!(openai.call_count(), 1);
}

#[tokio::test]
async fn invalid_bodies_are_unprocessable() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client"));

    let server = builder.build("").await;

    let bodies = [
        json!({ "temperature": 0.5 }),
        json!({ "prompt": "Hello", "temperature": 1.5 }),
        json!({ "prompt": "Hello", "temperature": -0.1 }),
        json!({ "prompt": "Hello", "max_tokens": 0 }),
        json!({ "prompt": "Hello", "max_tokens": -5 }),
        json!({ "prompt": "Hello", "provider": "anthropic" }),
    ];

    for body in bodies {
        let (status, response) = server
            .generate(body.clone())
            .credentials("test_client", TEST_SECRET)
            .send()
            .await;

        assert_eq!(status, 422, "{body} should be rejected, got {response}");
        assert_eq!(response["error"]["type"], "invalid_request_error");
    }

    assert_eq!(openai.call_count(), 0);
}

#[tokio::test]
async fn upstream_receives_gateway_api_key() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("test_client"));

    let server = builder.build("").await;

    server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    let calls = openai.calls();
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer test-openai-key"));
    assert_eq!(calls[0].prompt(), Some("Hello"));
}

#[tokio::test]
async fn client_default_provider_routes_the_call() {
    let mut builder = TestServer::builder();
    let openai = builder.spawn_openai(OpenAIMock::new("openai")).await;
    let groq = builder.spawn_groq(OpenAIMock::new("groq")).await;

    builder.client(
        ClientFixture::new("test_client")
            .providers(&["openai", "groq"])
            .default_provider("groq")
            .default_model("mixtral-8x7b-32768"),
    );

    let server = builder.build("").await;

    let (status, body) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("test_client", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["text"], "groq says: Hello");
    assert_eq!(body["model"], "mixtral-8x7b-32768");

    assert_eq!(openai.call_count(), 0);
    assert_eq!(groq.call_count(), 1);
}
