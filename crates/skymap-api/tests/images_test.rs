//! Image API integration tests.
//!
//! Run with: `cargo test -p skymap-api --test images_test`

mod helpers;

use helpers::{image_form, located_form, setup_test_app, setup_test_app_with, BASE_URL};
use serde_json::Value;
use skymap_processing::test_helpers::{gps_tiff, tiff_without_gps, GpsFixture, MockSkyImageStore};

#[tokio::test]
async fn test_upload_located_image() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("photo.tif"))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["latitude"], 28.6);
    assert_eq!(body["longitude"], 77.2);

    let url = body["image_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/sky-images/", BASE_URL)));
    assert!(url.ends_with("-photo.tif"));

    let keys = app.stored_keys();
    assert_eq!(keys.len(), 1);
    assert!(url.ends_with(&keys[0]));
    assert_eq!(app.records.rows().len(), 1);
}

#[tokio::test]
async fn test_upload_filename_with_double_dot() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("IMG_0001..tif"))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert!(body["image_url"].as_str().unwrap().ends_with("-IMG_0001..tif"));
    assert_eq!(app.stored_keys().len(), 1);
}

#[tokio::test]
async fn test_upload_without_location_is_rejected_before_storage() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(image_form(tiff_without_gps(), "plain.tif", "image/tiff"))
        .await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["code"], "NO_LOCATION_DATA");
    assert_eq!(body["error"], "This image does not contain location data.");
    assert!(app.stored_keys().is_empty());
    assert_eq!(app.records.insert_calls(), 0);
}

#[tokio::test]
async fn test_upload_partial_gps_is_no_location() {
    let app = setup_test_app().await;
    let data = gps_tiff(GpsFixture {
        longitude_ref: None,
        ..GpsFixture::delhi()
    });

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(image_form(data, "half.tif", "image/tiff"))
        .await;

    assert_eq!(response.status_code(), 422);
}

#[tokio::test]
async fn test_upload_unreadable_metadata() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(image_form(b"garbage bytes".to_vec(), "bad.jpg", "image/jpeg"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "METADATA_READ_FAILURE");
}

#[tokio::test]
async fn test_upload_rejects_disallowed_content_type() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(image_form(gps_tiff(GpsFixture::delhi()), "a.pdf", "application/pdf"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = setup_test_app_with(MockSkyImageStore::new(), |config| {
        config.max_file_size_bytes = 16;
    })
    .await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("big.tif"))
        .await;

    assert_eq!(response.status_code(), 413);
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let app = setup_test_app().await;

    let form = axum_test::multipart::MultipartForm::new().add_text("note", "no file here");
    let response = app.client().post("/api/v0/images").multipart(form).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_insert_failure_leaves_blob_and_hides_details() {
    let app = setup_test_app_with(MockSkyImageStore::failing(), |_| {}).await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("orphan.tif"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "RECORD_INSERT_FAILED");
    assert!(body.get("details").is_none());
    assert_eq!(app.stored_keys().len(), 1);
}

#[tokio::test]
async fn test_insert_failure_with_compensation_removes_blob() {
    let app = setup_test_app_with(MockSkyImageStore::failing(), |config| {
        config.orphan_policy = skymap_core::OrphanPolicy::Compensate;
    })
    .await;

    let response = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("orphan.tif"))
        .await;

    assert_eq!(response.status_code(), 500);
    assert!(app.stored_keys().is_empty());
}

#[tokio::test]
async fn test_session_uploads_complete_and_release() {
    let app = setup_test_app().await;

    for _ in 0..2 {
        let response = app
            .client()
            .post("/api/v0/images")
            .add_header("X-Session-Id", "dialog-1")
            .multipart(located_form("again.tif"))
            .await;
        assert_eq!(response.status_code(), 201);
    }

    assert_eq!(app.records.rows().len(), 2);
}

#[tokio::test]
async fn test_preview_location_stores_nothing() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/v0/images/location")
        .multipart(located_form("peek.tif"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["latitude"], 28.6);
    assert_eq!(body["longitude"], 77.2);
    assert!(app.stored_keys().is_empty());
    assert_eq!(app.records.insert_calls(), 0);
}

#[tokio::test]
async fn test_list_and_get_images() {
    let app = setup_test_app().await;

    let created: Value = app
        .client()
        .post("/api/v0/images")
        .multipart(located_form("one.tif"))
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let list = app.client().get("/api/v0/images").await;
    assert_eq!(list.status_code(), 200);
    let rows: Vec<Value> = list.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], id);

    let single = app.client().get(&format!("/api/v0/images/{}", id)).await;
    assert_eq!(single.status_code(), 200);
    assert_eq!(single.json::<Value>()["image_url"], created["image_url"]);

    let missing = app.client().get("/api/v0/images/999").await;
    assert_eq!(missing.status_code(), 404);
    assert_eq!(missing.json::<Value>()["code"], "NOT_FOUND");
}
