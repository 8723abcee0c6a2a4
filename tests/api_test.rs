use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use trackbox::api::models::{DownloadResponse, ErrorResponse, ListResponse, StatusResponse};
use trackbox::api::router;
use trackbox::api::state::AppState;
use trackbox::config::Config;

/// Builds a test app whose upstream calls fail fast against a closed local port
fn build_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config::default();
    config.upstream.api_base_url = "http://127.0.0.1:9".to_string();
    config.downloads.default_output_dir = temp_dir.path().join("downloads");

    let state = AppState::new(config).expect("Failed to build app state");
    (router(state), temp_dir)
}

fn post_download(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri("/downloads")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: impl AsRef<str>) -> Request<Body> {
    Request::builder()
        .uri(uri.as_ref())
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_start_download_accepted() {
    let (app, _temp_dir) = build_test_app();

    let request = post_download(json!({
        "soundcloud_url": "http://127.0.0.1:9/soundcloud.com/user/12345",
        "output_directory": "out"
    }));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let started: DownloadResponse = read_json(response).await;
    assert!(started.download_id.starts_with("dl_"));
    assert_eq!(started.status, "started");
    assert_eq!(started.message, "Download started");
}

#[tokio::test]
async fn test_start_download_empty_url() {
    let (app, _temp_dir) = build_test_app();

    let request = post_download(json!({ "soundcloud_url": "" }));
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.code, "INVALID_ARGUMENT");
    assert_eq!(error.message, "soundcloud_url is required");

    // No record was created
    let list: ListResponse = read_json(app.oneshot(get("/downloads")).await.unwrap()).await;
    assert_eq!(list.total_count, 0);
}

#[tokio::test]
async fn test_start_download_wrong_host() {
    let (app, _temp_dir) = build_test_app();

    let response = app
        .oneshot(post_download(json!({ "soundcloud_url": "https://example.com/user/1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.message, "invalid SoundCloud URL");
}

#[tokio::test]
async fn test_start_download_malformed_body() {
    let (app, _temp_dir) = build_test_app();

    let request = Request::builder()
        .uri("/downloads")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.code, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_status_after_start() {
    let (app, _temp_dir) = build_test_app();

    let request = post_download(json!({
        "soundcloud_url": "http://127.0.0.1:9/soundcloud.com/user/12345"
    }));
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();
    let started: DownloadResponse = read_json(response).await;

    let response = app
        .oneshot(get(format!("/downloads/{}", started.download_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status: StatusResponse = read_json(response).await;
    assert_eq!(status.download_id, started.download_id);
    assert!(
        ["pending", "downloading", "failed"].contains(&status.status.as_str()),
        "unexpected status {}",
        status.status
    );
    assert!(status.file_path.is_empty());
}

#[tokio::test]
async fn test_status_not_found() {
    let (app, _temp_dir) = build_test_app();

    let response = app.oneshot(get("/downloads/dl_missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.code, "NOT_FOUND");
}

#[tokio::test]
async fn test_status_empty_id_is_invalid_argument() {
    let (app, _temp_dir) = build_test_app();

    let response = app.oneshot(get("/downloads/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.code, "INVALID_ARGUMENT");
    assert_eq!(error.message, "download_id is required");
}

#[tokio::test]
async fn test_list_limit_and_total() {
    let (app, _temp_dir) = build_test_app();

    for track in 1..=3 {
        let request = post_download(json!({
            "soundcloud_url": format!("http://127.0.0.1:9/soundcloud.com/user/{track}")
        }));
        let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let limited: ListResponse = read_json(
        ServiceExt::<Request<Body>>::oneshot(app.clone(), get("/downloads?limit=2&offset=0"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(limited.downloads.len(), 2);
    assert_eq!(limited.total_count, 3);
    assert!(limited.downloads[0].soundcloud_url.ends_with("/user/1"));
    assert!(!limited.downloads[0].created_at.is_empty());

    let all: ListResponse = read_json(app.oneshot(get("/downloads?limit=0")).await.unwrap()).await;
    assert_eq!(all.downloads.len(), 3);
    assert_eq!(all.total_count, 3);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp_dir) = build_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: serde_json::Value = read_json(response).await;
    assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("healthy"));
    assert!(health.get("version").is_some());

    let counters = health.get("counters").and_then(|v| v.as_object()).unwrap();
    assert!(counters.contains_key("jobs_started"));
    assert!(counters.contains_key("bytes_downloaded"));
}
