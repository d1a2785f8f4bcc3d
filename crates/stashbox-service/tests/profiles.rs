//! Profile management integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn profile_is_absent_until_created() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/profiles/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn upsert_then_get_roundtrip() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .put("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "photo_url": "https://example.com/jane.png"
        }))
        .await;

    response.assert_status_ok();

    let fetched = harness
        .server
        .get("/v1/profiles/me")
        .add_header("authorization", harness.user_auth_header())
        .await;

    fetched.assert_status_ok();
    let body: serde_json::Value = fetched.json();
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["first_name"], "Jane");
    assert_eq!(body["last_name"], "Doe");
    assert_eq!(body["photo_url"], "https://example.com/jane.png");
}

#[tokio::test]
async fn update_keeps_creation_time() {
    let harness = TestHarness::new();

    let created = harness
        .server
        .put("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe"
        }))
        .await;
    created.assert_status_ok();
    let first: serde_json::Value = created.json();

    let updated = harness
        .server
        .put("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "email": "jane.doe@example.com",
            "first_name": "Jane",
            "last_name": "Doe"
        }))
        .await;
    updated.assert_status_ok();
    let second: serde_json::Value = updated.json();

    assert_eq!(second["email"], "jane.doe@example.com");
    assert_eq!(second["created_at"], first["created_at"]);
}

#[tokio::test]
async fn delete_removes_the_profile() {
    let harness = TestHarness::new();

    harness
        .server
        .put("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe"
        }))
        .await
        .assert_status_ok();

    harness
        .server
        .delete("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    harness
        .server
        .get("/v1/profiles/me")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();

    // Deleting a missing profile reports not found.
    harness
        .server
        .delete("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn profiles_are_scoped_to_the_caller() {
    let harness = TestHarness::new();

    harness
        .server
        .put("/v1/profiles")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe"
        }))
        .await
        .assert_status_ok();

    harness
        .server
        .get("/v1/profiles/me")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await
        .assert_status_not_found();
}
