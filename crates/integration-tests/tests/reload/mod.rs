use integration_tests::{ClientFixture, OpenAIMock, TEST_SECRET, TestServer};
use serde_json::json;

fn admin() -> ClientFixture {
    ClientFixture::new("admin").endpoints(&["generate", "clients/reload"])
}

async fn server() -> TestServer {
    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(admin());

    builder.build("").await
}

#[tokio::test]
async fn picks_up_new_clients() {
    let server = server().await;

    server.write_client(&ClientFixture::new("newcomer"));

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("newcomer", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 401);

    let (status, body) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(status, 200);
    insta::assert_json_snapshot!(body, @r#"
    {
      "count": 2,
      "message": "Successfully reloaded 2 client configurations"
    }
    "#);

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("newcomer", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 200);
}

#[tokio::test]
async fn reload_is_idempotent() {
    let server = server().await;

    let (_, first) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;
    let (_, second) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(first, second);
    assert_eq!(first["count"], 1);
}

#[tokio::test]
async fn removed_clients_disappear() {
    let server = server().await;

    server.write_client(&ClientFixture::new("temporary"));
    server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    server.remove_client("temporary");

    let (status, body) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);

    let (status, _) = server
        .generate(json!({ "prompt": "Hello" }))
        .credentials("temporary", TEST_SECRET)
        .send()
        .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn reload_with_no_valid_files_locks_everyone_out() {
    let server = server().await;

    std::fs::write(server.clients_dir().join("admin.json"), "{ broken").unwrap();

    let (status, body) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(status, 200);
    assert_eq!(body["count"], 0);

    let (status, _) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn reload_requires_permission() {
    let mut builder = TestServer::builder();
    builder.spawn_openai(OpenAIMock::new("openai")).await;
    builder.client(ClientFixture::new("regular"));

    let server = builder.build("").await;

    let (status, body) = server.reload_clients().credentials("regular", TEST_SECRET).send().await;

    assert_eq!(status, 403);
    assert_eq!(
        body["error"]["message"],
        "Client does not have permission to access endpoint: clients/reload"
    );
}

#[tokio::test]
async fn invalid_files_are_skipped() {
    let server = server().await;

    std::fs::write(server.clients_dir().join("broken.json"), "not json").unwrap();
    std::fs::write(server.clients_dir().join("readme.txt"), "ignored").unwrap();

    let (status, body) = server.reload_clients().credentials("admin", TEST_SECRET).send().await;

    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);
}
