//! Integration tests for user record routes.

mod common;

use common::TestHarness;

#[tokio::test]
async fn create_user() {
    let h = TestHarness::with_server().await;

    let resp = h
        .client
        .post(h.url("/users"))
        .json(&serde_json::json!({ "username": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["username"], "alice");
    assert!(json["id"].is_i64());
    assert!(json["avatar_path"].is_null());
}

#[tokio::test]
async fn create_user_with_explicit_id() {
    let h = TestHarness::with_server().await;

    let resp = h
        .client
        .post(h.url("/users"))
        .json(&serde_json::json!({ "username": "seven", "id": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["id"], 7);
}

#[tokio::test]
async fn duplicate_username_is_400() {
    let h = TestHarness::with_server().await;
    h.create_user("alice");

    let resp = h
        .client
        .post(h.url("/users"))
        .json(&serde_json::json!({ "username": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "duplicate_username");
    assert!(json["error"].as_str().unwrap().contains("alice"));
    assert!(json["request_id"].is_string());
}

#[tokio::test]
async fn missing_username_is_400() {
    let h = TestHarness::with_server().await;

    let resp = h
        .client
        .post(h.url("/users"))
        .json(&serde_json::json!({ "name": "wrong-field" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn get_user() {
    let h = TestHarness::with_server().await;
    let id = h.create_user("bob");

    let resp = h.client.get(h.url(&format!("/users/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["id"], id);
    assert_eq!(json["username"], "bob");
    assert!(json["avatar_path"].is_null());
    assert!(json["avatar_url"].is_null());
}

#[tokio::test]
async fn get_missing_user_is_404() {
    let h = TestHarness::with_server().await;

    let resp = h.client.get(h.url("/users/999")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "user_not_found");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let h = TestHarness::with_server().await;

    let resp = h
        .client
        .get(h.url("/users/1"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-me");
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["request_id"], "trace-me");
}

#[tokio::test]
async fn health_check() {
    let h = TestHarness::with_server().await;
    let resp = h.client.get(h.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}
