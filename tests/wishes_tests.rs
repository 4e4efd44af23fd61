
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_fixtures::*;
use test_utils::*;
use uuid::Uuid;

async fn create(app: &TestApp, body: Value) -> Value {
    let (status, response) = app.post_json("/api/wishes", &body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", response);
    response["data"].clone()
}

#[actix_rt::test]
async fn create_wish_returns_201_with_defaults() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post_json("/api/wishes", &new_wish("  Linh ", "Wishing you a lifetime of joy"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let wish = &body["data"];
    assert_eq!(wish["name"], "Linh");
    assert_eq!(wish["language"], "en");
    assert_eq!(wish["likes"], 0);
    assert!(Uuid::parse_str(wish["id"].as_str().unwrap()).is_ok());
    assert_eq!(wish["createdAt"], wish["updatedAt"]);
    assert_eq!(app.document_count("wishes"), 1);
}

#[actix_rt::test]
async fn create_without_required_fields_returns_400() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post_json("/api/wishes", &json!({ "name": "Linh", "wish": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = app.post_json("/api/wishes", &json!({ "wish": "No name" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    assert_eq!(app.document_count("wishes"), 0);
}

#[actix_rt::test]
async fn malformed_email_returns_400_on_create_and_update() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post_json("/api/wishes", &json!({ "name": "Ana", "wish": "Cheers", "email": "not-an-email" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("email"));
    assert_eq!(app.document_count("wishes"), 0);

    let wish = create(&app, json!({ "name": "Ana", "wish": "Cheers", "email": "ana@example.com" })).await;
    assert_eq!(wish["email"], "ana@example.com");
    let path = format!("/api/wishes/{}", wish["id"].as_str().unwrap());

    let (status, body) = app.put_json(&path, &json!({ "email": "ana@" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, body) = app.get(&path).await;
    assert_eq!(body["data"]["email"], "ana@example.com");
}

#[actix_rt::test]
async fn blank_email_clears_the_address() {
    let app = TestApp::spawn().await;
    let wish = create(&app, json!({ "name": "Ana", "wish": "Cheers", "email": "  " })).await;
    assert!(wish["email"].is_null());

    let path = format!("/api/wishes/{}", wish["id"].as_str().unwrap());
    let (status, body) = app.put_json(&path, &json!({ "email": " ana@example.com " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.com");

    let (status, body) = app.put_json(&path, &json!({ "email": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["email"].is_null());
}

#[actix_rt::test]
async fn malformed_json_returns_400_envelope() {
    let app = TestApp::spawn().await;

    let response = app.client
        .post(app.url("/api/wishes"))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn list_is_newest_first_and_filterable() {
    let app = TestApp::spawn().await;

    let first = create(&app, json!({ "name": "A", "wish": "one", "tone": "funny" })).await;
    let second = create(&app, json!({ "name": "B", "wish": "two", "tone": "warm", "language": "vi" })).await;
    let third = create(&app, json!({ "name": "C", "wish": "three", "tone": "funny", "language": "vi" })).await;

    let (status, body) = app.get("/api/wishes").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|w| &w["id"]).collect();
    assert_eq!(ids, vec![&third["id"], &second["id"], &first["id"]]);

    let (_, body) = app.get("/api/wishes?language=vi&tone=funny").await;
    let filtered = body["data"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], third["id"]);
}

#[actix_rt::test]
async fn tone_and_language_filters_ignore_case() {
    let app = TestApp::spawn().await;
    let wish = create(&app, json!({ "name": "A", "wish": "one", "tone": "Funny", "language": "VI" })).await;
    assert_eq!(wish["tone"], "funny");
    assert_eq!(wish["language"], "vi");

    for query in ["?tone=funny", "?tone=FUNNY", "?language=Vi&tone=Funny"] {
        let (status, body) = app.get(&format!("/api/wishes{query}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1, "{query}");
    }
}

#[actix_rt::test]
async fn update_merges_supplied_fields() {
    let app = TestApp::spawn().await;
    let wish = create(&app, new_wish("Linh", "Congrats")).await;
    let id = wish["id"].as_str().unwrap();

    let (status, body) = app
        .put_json(&format!("/api/wishes/{id}"), &json!({ "wish": "Congrats, both of you!", "tone": "" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["wish"], "Congrats, both of you!");
    assert_eq!(updated["name"], "Linh");
    assert_eq!(updated["relation"], "Friend");
    assert!(updated["tone"].is_null());
}

#[actix_rt::test]
async fn update_of_missing_wish_returns_404() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .put_json(&format!("/api/wishes/{}", Uuid::new_v4()), &json!({ "wish": "Hi" }))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(app.document_count("wishes"), 0);
}

#[actix_rt::test]
async fn delete_then_get_returns_404() {
    let app = TestApp::spawn().await;
    let wish = create(&app, new_wish("Linh", "Congrats")).await;
    let path = format!("/api/wishes/{}", wish["id"].as_str().unwrap());

    let (status, body) = app.delete(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.get(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app.delete(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn likes_are_counted_and_floored_at_zero() {
    let app = TestApp::spawn().await;
    let wish = create(&app, new_wish("Linh", "Congrats")).await;
    let path = format!("/api/wishes/{}/like", wish["id"].as_str().unwrap());

    let (_, body) = app.post_json(&path, &json!({ "action": "unlike" })).await;
    assert_eq!(body["data"]["likes"], 0);

    app.post_json(&path, &json!({ "action": "like" })).await;
    app.post_json(&path, &json!({ "action": "like" })).await;
    let (status, body) = app.post_json(&path, &json!({ "action": "unlike" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likes"], 1);

    let (status, _) = app.post_json(&path, &json!({ "action": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn stats_overview_tallies_wishes() {
    let app = TestApp::spawn().await;
    let liked = create(&app, json!({ "name": "A", "wish": "one", "tone": "Funny", "relation": "friend" })).await;
    create(&app, json!({ "name": "B", "wish": "two", "tone": "funny", "language": "vi" })).await;
    let latest = create(&app, json!({ "name": "C", "wish": "three" })).await;
    app.post_json(
        &format!("/api/wishes/{}/like", liked["id"].as_str().unwrap()),
        &json!({ "action": "like" }),
    )
    .await;

    let (status, body) = app.get("/api/wishes/stats/overview").await;

    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["totalLikes"], 1);
    assert_eq!(stats["byTone"], json!({ "funny": 2, "unspecified": 1 }));
    assert_eq!(stats["byLanguage"], json!({ "en": 2, "vi": 1 }));
    assert_eq!(stats["byRelation"], json!({ "friend": 1, "unspecified": 2 }));
    assert_eq!(stats["latestAt"], latest["createdAt"]);
}

#[actix_rt::test]
async fn stats_of_empty_collection() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/wishes/stats/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    assert!(body["data"]["latestAt"].is_null());
}
