//! API client integration tests against a fake HTTP server

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use controlroom_e2e::error::HarnessError;
use controlroom_e2e::naming::unique_name;
use controlroom_e2e::{ApiClient, ResponseBody};

async fn client_for(server: &MockServer) -> ApiClient {
    controlroom_e2e::init_logging("warn");
    let mut client = ApiClient::new(server.uri());
    client.init().unwrap();
    client
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({ "username": "alice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_token_and_attaches_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-123").await;

    // Auth header decides which arm answers: explicit bearer gets the data,
    // anything else the server's own 401
    Mock::given(method("GET"))
        .and(path("/api/learningInstance"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [], "total": 0, "page": 1 })),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/learningInstance"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "unauthorized" })))
        .with_priority(5)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;

    // Before login: no authorization header at all, server 401 comes back
    // as a value
    let response = client.get("/api/learningInstance").await.unwrap();
    assert_eq!(response.status, 401);

    let token = client.login("alice", "s3cret").await.unwrap();
    assert_eq!(token, "tok-123");
    assert_eq!(client.token().unwrap().as_deref(), Some("tok-123"));

    let response = client.get("/api/learningInstance").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["total"], 0);

    client.dispose();
}

#[tokio::test]
async fn test_rejected_login_leaves_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad creds" })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client.set_token("stale").unwrap();

    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, HarnessError::AuthenticationRejected { status: 401 }));
    assert_eq!(client.token().unwrap(), None);
}

#[tokio::test]
async fn test_login_without_token_field_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let err = client.login("alice", "s3cret").await.unwrap_err();
    assert!(matches!(err, HarnessError::TokenMissing));
}

#[tokio::test]
async fn test_learning_instance_round_trip() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-rt").await;

    let name = unique_name("LearningInstance");

    Mock::given(method("POST"))
        .and(path("/api/learningInstance"))
        .and(body_partial_json(json!({ "name": name })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "li-42", "name": name })),
        )
        .mount(&server)
        .await;

    // The instance exists for exactly one GET; after the DELETE the
    // catch-all 404 answers
    Mock::given(method("GET"))
        .and(path("/api/learningInstance/li-42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "li-42", "name": name })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/learningInstance/li-42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "not found" })))
        .with_priority(5)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/learningInstance/li-42"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client.login("alice", "s3cret").await.unwrap();

    let created = client
        .post("/api/learningInstance", &json!({ "name": name }))
        .await
        .unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.str_field("id"), Some("li-42"));

    let fetched = client.get("/api/learningInstance/li-42").await.unwrap();
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.str_field("name"), Some(name.as_str()));

    let deleted = client.delete("/api/learningInstance/li-42").await.unwrap();
    assert_eq!(deleted.status, 204);

    let gone = client.get("/api/learningInstance/li-42").await.unwrap();
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn test_update_via_put_and_patch() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/learningInstance/li-7"))
        .and(body_partial_json(json!({ "name": "Renamed" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "li-7", "name": "Renamed" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/learningInstance/li-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "li-7", "description": "patched" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let updated = client
        .put("/api/learningInstance/li-7", &json!({ "name": "Renamed" }))
        .await
        .unwrap();
    assert_eq!(updated.status, 200);
    assert_eq!(updated.str_field("name"), Some("Renamed"));

    let patched = client
        .patch("/api/learningInstance/li-7", &json!({ "description": "patched" }))
        .await
        .unwrap();
    assert_eq!(patched.str_field("description"), Some("patched"));
}

#[tokio::test]
async fn test_create_without_name_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/learningInstance"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "name is required" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client.post("/api/learningInstance", &json!({})).await.unwrap();

    assert_eq!(response.status, 400);
    assert!(response.str_field("error").unwrap().contains("name"));
}

#[tokio::test]
async fn test_list_passes_paging_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/learningInstance"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "id": "li-1" }], "total": 1, "page": 1 })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .get_query("/api/learningInstance", &[("page", "1"), ("limit", "10")])
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert!(body["data"].is_array());
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_non_json_body_falls_back_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service restarting"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client.get("/maintenance").await.unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.body, ResponseBody::Text("Service restarting".to_string()));
    assert!(response.headers.contains_key("content-type"));
}
