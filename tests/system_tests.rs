
use reqwest::StatusCode;
use test_fixtures::*;
use test_utils::*;

#[actix_rt::test]
async fn home_returns_welcome_envelope() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn health_reports_uptime_and_store_status() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["data"]["uptime"].is_string());
    assert!(body["data"]["documentStoreConnected"].is_boolean());
}

#[actix_rt::test]
async fn firebase_status_reports_connected_store() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/firebase-status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["backend"], "memory");
    assert_eq!(body["data"]["projectId"], app.config.project_id);
}

#[actix_rt::test]
async fn firebase_status_returns_500_when_store_is_down() {
    let app = TestApp::spawn_with_unreachable_documents().await;

    let (status, body) = app.get("/firebase-status").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Internal server error");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[actix_rt::test]
async fn docs_lists_default_collection() {
    let app = TestApp::spawn().await;
    app.upload_ok(sample_video(), "a.mp4", "video/mp4").await;
    app.upload_ok(sample_video(), "b.mp4", "video/mp4").await;

    let (status, body) = app.get("/docs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["collection"], "media");
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["documents"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn docs_returns_500_when_store_is_down() {
    let app = TestApp::spawn_with_unreachable_documents().await;

    let (status, body) = app.get("/docs").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn unknown_route_returns_404_envelope() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
}

#[actix_rt::test]
async fn trailing_slash_is_normalised() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/media/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[actix_rt::test]
async fn wrong_method_on_known_path_returns_404_envelope() {
    let app = TestApp::spawn().await;

    let attempts = [
        (reqwest::Method::POST, "/api/media"),
        (reqwest::Method::GET, "/api/media/upload"),
        (reqwest::Method::PATCH, "/api/wishes/stats/overview"),
        (reqwest::Method::PATCH, "/api/wishes/some-id"),
        (reqwest::Method::DELETE, "/health"),
        (reqwest::Method::POST, "/"),
    ];

    for (method, path) in attempts {
        let response = app
            .client
            .request(method.clone(), app.url(path))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, path);
        let body: serde_json::Value = response.json().await.expect("Body is not a JSON envelope");
        assert_eq!(body["success"], false, "{} {}", method, path);
        assert_eq!(body["error"], "not_found", "{} {}", method, path);
        assert!(body["message"].as_str().unwrap().contains(method.as_str()));
    }
}
