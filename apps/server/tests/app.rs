use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use hq_server::Server;
use serde_json::Value;
use tower::ServiceExt;

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    (status, to_bytes(response.into_body(), usize::MAX).await.expect("body").to_vec())
}

#[tokio::test]
async fn seeded_server_serves_every_router() {
    let server = Server::builder().seed(true).build().await.expect("server");
    assert_eq!(server.state().slice_count(), 2);
    let app = server.app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(health["status"], "up");

    let (status, body) = get(&app, "/heroes").await;
    assert_eq!(status, StatusCode::OK);
    let heroes: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(heroes.as_array().map(Vec::len), Some(10));

    let (status, body) = get(&app, "/api").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).expect("utf-8");
    assert!(page.contains("/send-test-email"));
}

#[tokio::test]
async fn unseeded_server_starts_empty() {
    let server = Server::builder().build().await.expect("server");
    let (status, body) = get(&server.app(), "/powers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).expect("json"), Value::Array(Vec::new()));
}
