//! File upload and management integration tests.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use common::{text_part, TestHarness};

async fn balance(harness: &TestHarness) -> i64 {
    let response = harness
        .server
        .get("/v1/credits")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["credits"].as_i64().unwrap()
}

async fn upload_one(harness: &TestHarness, file_name: &str, contents: &[u8]) -> serde_json::Value {
    let form = MultipartForm::new().add_part("files", text_part(file_name, contents));
    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["files"][0].clone()
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn upload_stores_record_and_charges_one_credit() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "notes.txt", b"hello stash").await;
    assert_eq!(file["name"], "notes.txt");
    assert_eq!(file["size_bytes"], 11);
    assert_eq!(file["is_public"], false);

    assert_eq!(balance(&harness).await, 4);
}

#[tokio::test]
async fn upload_batch_preserves_input_order() {
    let harness = TestHarness::new();

    let form = MultipartForm::new()
        .add_part("files", text_part("first.txt", b"one"))
        .add_part("files", text_part("second.txt", b"two"))
        .add_part("files", text_part("third.txt", b"three"));

    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let names: Vec<_> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["first.txt", "second.txt", "third.txt"]);
    assert_eq!(balance(&harness).await, 2);
}

#[tokio::test]
async fn upload_beyond_balance_is_rejected_up_front() {
    let harness = TestHarness::new();

    // Spend 3 of the 5 signup credits.
    for name in ["a.txt", "b.txt", "c.txt"] {
        upload_one(&harness, name, b"data").await;
    }
    assert_eq!(balance(&harness).await, 2);

    // A batch of 3 no longer fits; nothing may be stored or charged.
    let form = MultipartForm::new()
        .add_part("files", text_part("d.txt", b"data"))
        .add_part("files", text_part("e.txt", b"data"))
        .add_part("files", text_part("f.txt", b"data"));

    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_credits");
    assert_eq!(body["error"]["details"]["balance"], 2);
    assert_eq!(body["error"]["details"]["required"], 3);

    assert_eq!(balance(&harness).await, 2);

    let list = harness
        .server
        .get("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .await;
    list.assert_status_ok();
    let files: serde_json::Value = list.json();
    assert_eq!(files.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let harness = TestHarness::new();

    let form = MultipartForm::new().add_text("unrelated", "value");
    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn upload_rejects_empty_file() {
    let harness = TestHarness::new();

    let form = MultipartForm::new().add_part("files", text_part("empty.txt", b""));
    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status_bad_request();
    assert_eq!(balance(&harness).await, 5);
}

#[tokio::test]
async fn upload_rejects_oversize_file() {
    let harness = TestHarness::new();

    let oversize = vec![0u8; 10 * 1024 * 1024 + 1];
    let form = MultipartForm::new().add_part("files", text_part("big.txt", &oversize));
    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status_bad_request();
    assert_eq!(balance(&harness).await, 5);
}

#[tokio::test]
async fn upload_rejects_missing_extension() {
    let harness = TestHarness::new();

    let form = MultipartForm::new().add_part("files", text_part("noext", b"data"));
    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn upload_rejects_disallowed_extension_and_fails_fast() {
    let harness = TestHarness::new();

    // The first file is valid and gets stored; the second aborts the call.
    let form = MultipartForm::new()
        .add_part("files", text_part("good.txt", b"fine"))
        .add_part("files", text_part("evil.exe", b"nope"));

    let response = harness
        .server
        .post("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    // Earlier files of the batch stay stored and charged.
    let list = harness
        .server
        .get("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let files: serde_json::Value = list.json();
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["name"], "good.txt");
    assert_eq!(balance(&harness).await, 4);
}

#[tokio::test]
async fn upload_requires_auth() {
    let harness = TestHarness::new();

    let form = MultipartForm::new().add_part("files", text_part("a.txt", b"data"));
    let response = harness.server.post("/v1/files").multipart(form).await;
    response.assert_status_unauthorized();
}

// ============================================================================
// Listing and visibility
// ============================================================================

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let harness = TestHarness::new();

    upload_one(&harness, "mine.txt", b"data").await;

    let response = harness
        .server
        .get("/v1/files")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_ok();
    let files: serde_json::Value = response.json();
    assert!(files.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn private_file_is_invisible_until_toggled_public() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "shared.txt", b"data").await;
    let id = file["id"].as_str().unwrap().to_string();

    // Private: public lookup reports not found.
    harness
        .server
        .get(&format!("/v1/files/public/{id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();

    // Toggle to public.
    let toggled = harness
        .server
        .patch(&format!("/v1/files/{id}/visibility"))
        .add_header("authorization", harness.user_auth_header())
        .await;
    toggled.assert_status_ok();
    let body: serde_json::Value = toggled.json();
    assert_eq!(body["is_public"], true);

    // Now the public lookup succeeds.
    let public = harness
        .server
        .get(&format!("/v1/files/public/{id}"))
        .add_header("authorization", harness.user_auth_header())
        .await;
    public.assert_status_ok();
    let body: serde_json::Value = public.json();
    assert_eq!(body["name"], "shared.txt");
}

#[tokio::test]
async fn visibility_toggle_is_not_owner_scoped() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "mine.txt", b"data").await;
    let id = file["id"].as_str().unwrap().to_string();

    // Any authenticated user can flip visibility.
    let response = harness
        .server
        .patch(&format!("/v1/files/{id}/visibility"))
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_public"], true);
}

// ============================================================================
// Download and delete
// ============================================================================

#[tokio::test]
async fn download_returns_original_bytes() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "notes.txt", b"hello stash").await;
    let id = file["id"].as_str().unwrap().to_string();

    let response = harness
        .server
        .get(&format!("/v1/files/{id}/download"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello stash");

    let disposition = response.header("content-disposition");
    assert!(disposition.to_str().unwrap().contains("notes.txt"));
}

#[tokio::test]
async fn download_missing_file_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!(
            "/v1/files/{}/download",
            stashbox_core::FileId::generate()
        ))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "mine.txt", b"data").await;
    let id = file["id"].as_str().unwrap().to_string();

    let response = harness
        .server
        .delete(&format!("/v1/files/{id}"))
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);

    // The record is untouched.
    let list = harness
        .server
        .get("/v1/files")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let files: serde_json::Value = list.json();
    assert_eq!(files.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_by_owner_removes_record_and_bytes() {
    let harness = TestHarness::new();

    let file = upload_one(&harness, "mine.txt", b"data").await;
    let id = file["id"].as_str().unwrap().to_string();

    harness
        .server
        .delete(&format!("/v1/files/{id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    harness
        .server
        .get(&format!("/v1/files/{id}/download"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();

    // Deleting again reports not found.
    harness
        .server
        .delete(&format!("/v1/files/{id}"))
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_not_found();
}
