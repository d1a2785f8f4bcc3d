//! Credit balance integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn fresh_user_gets_signup_credits() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/credits")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits"], 5);
    assert_eq!(body["plan"], "BASIC");
}

#[tokio::test]
async fn balance_read_is_idempotent() {
    let harness = TestHarness::new();

    for _ in 0..3 {
        let response = harness
            .server
            .get("/v1/credits")
            .add_header("authorization", harness.user_auth_header())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["credits"], 5);
    }
}

#[tokio::test]
async fn balance_requires_auth() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/credits").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn malformed_test_token_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/credits")
        .add_header("authorization", "Bearer test-token:not-a-uuid")
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn users_have_independent_ledgers() {
    let harness = TestHarness::new();

    // Spend a credit as the main user.
    let form = axum_test::multipart::MultipartForm::new()
        .add_part("files", common::text_part("a.txt", b"hello"));
    harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await
        .assert_status_ok();

    // A different user still sees the untouched default.
    let response = harness
        .server
        .get("/v1/credits")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits"], 5);
}
