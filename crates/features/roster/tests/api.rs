mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use hq_database::Database;
use hq_kernel::server::ApiState;
use hq_roster::seed::seed;
use hq_roster::{Repository, init, router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    app_on(common::database().await).await
}

async fn app_on(db: Database) -> Router {
    seed(&Repository::new(db.clone())).await.expect("seed");

    let state = ApiState::builder()
        .db(db.clone())
        .register_slice(init(&db).expect("roster slice"))
        .build()
        .expect("state");
    let (router, _) = router().split_for_parts();
    router.with_state(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json") };
    (status, value)
}

#[tokio::test]
async fn lists_and_lookups() {
    let app = app().await;

    let (status, heroes) = call(&app, Method::GET, "/heroes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(heroes.as_array().map(Vec::len), Some(10));
    assert_eq!(heroes[0], json!({ "id": 1, "name": "Kamala Khan", "super_name": "Ms. Marvel" }));

    let (status, hero) = call(&app, Method::GET, "/heroes/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hero["super_name"], "Spider-Gwen");
    assert_eq!(hero["hero_powers"].as_array().map(Vec::len), Some(1));
    assert_eq!(hero["hero_powers"][0]["hero"]["id"], 3);

    let (status, body) = call(&app, Method::GET, "/heroes/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Hero not found" }));

    let (status, body) = call(&app, Method::GET, "/heroes/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Hero not found" }));

    let (status, powers) = call(&app, Method::GET, "/powers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(powers.as_array().map(Vec::len), Some(4));

    let (status, power) = call(&app, Method::GET, "/powers/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(power["name"], "flight");

    let (status, body) = call(&app, Method::GET, "/powers/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Power not found" }));
}

#[tokio::test]
async fn patch_power_checks_existence_then_body() {
    let app = app().await;

    let (status, body) =
        call(&app, Method::PATCH, "/powers/999", Some(json!({ "description": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Power not found" }));

    let (status, body) = call(&app, Method::PATCH, "/powers/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Description is required"] }));

    let (status, body) = call(&app, Method::PATCH, "/powers/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Description is required"] }));

    let (status, body) =
        call(&app, Method::PATCH, "/powers/1", Some(json!({ "description": "Too short" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Description must be at least 20 characters long"] }));

    let description = "Updated description with more than twenty characters";
    let (status, power) =
        call(&app, Method::PATCH, "/powers/1", Some(json!({ "description": description }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(power["description"], description);

    let (_, fetched) = call(&app, Method::GET, "/powers/1", None).await;
    assert_eq!(fetched, power);
}

#[tokio::test]
async fn create_hero_power_end_to_end() {
    let app = app().await;

    let (status, view) = call(
        &app,
        Method::POST,
        "/hero_powers",
        Some(json!({ "strength": "Average", "power_id": 1, "hero_id": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["strength"], "Average");
    assert_eq!(view["hero_id"], 3);
    assert_eq!(view["power_id"], 1);
    assert_eq!(view["hero"], json!({ "id": 3, "name": "Gwen Stacy", "super_name": "Spider-Gwen" }));
    assert_eq!(view["power"]["name"], "super strength");

    let (_, hero) = call(&app, Method::GET, "/heroes/3", None).await;
    assert_eq!(hero["hero_powers"].as_array().map(Vec::len), Some(2));

    let (status, body) = call(
        &app,
        Method::POST,
        "/hero_powers",
        Some(json!({ "strength": "Invalid", "power_id": 1, "hero_id": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Strength must be one of: Strong, Weak, Average"] }));

    let (status, body) = call(
        &app,
        Method::POST,
        "/hero_powers",
        Some(json!({ "strength": "Average", "power_id": 1, "hero_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "errors": ["Hero not found"] }));

    let (status, body) = call(
        &app,
        Method::POST,
        "/hero_powers",
        Some(json!({ "strength": "Average", "power_id": 999, "hero_id": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "errors": ["Power not found"] }));
}

#[tokio::test]
async fn store_fault_is_a_500_and_changes_nothing() {
    let db = common::database().await;
    let app = app_on(db.clone()).await;
    db.query("DEFINE FIELD OVERWRITE description ON power TYPE string ASSERT $value != 'A description the store refuses';")
        .await
        .expect("define")
        .check()
        .expect("assertion installed");

    let (_, before) = call(&app, Method::GET, "/powers/1", None).await;
    let (status, body) = call(
        &app,
        Method::PATCH,
        "/powers/1",
        Some(json!({ "description": "A description the store refuses" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "errors": ["An error occurred while updating the power"] }));

    let (status, after) = call(&app, Method::GET, "/powers/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after, before);
}

#[tokio::test]
async fn create_hero_power_reports_missing_input() {
    let app = app().await;

    let (status, body) = call(&app, Method::POST, "/hero_powers", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["Request body is required"] }));

    let (status, body) =
        call(&app, Method::POST, "/hero_powers", Some(json!({ "power_id": 1, "hero_id": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["strength is required"] }));

    let (status, body) =
        call(&app, Method::POST, "/hero_powers", Some(json!({ "strength": "Weak" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errors": ["power_id is required"] }));
}

#[test]
fn routes_are_documented() {
    let (_, openapi) = router().split_for_parts();
    for path in ["/heroes", "/heroes/{id}", "/powers", "/powers/{id}", "/hero_powers"] {
        assert!(openapi.paths.paths.contains_key(path), "{path} missing from the document");
    }
}
