//! Integration tests for Store API endpoints, including the pagination
//! contract.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, routes};
use crate::db::SqliteDatabase;

async fn test_app() -> axum::Router {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    routes::create_router(AppState::new(db))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create_store(app: &axum::Router, square_meters: i64) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/stores")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "country": "Germany",
                        "state": "Bavaria",
                        "square_meters": square_meters,
                        "open_date": "2012-05-01"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test(flavor = "multi_thread")]
async fn pagination_windows_over_25_records() {
    let app = test_app().await;
    for i in 1..=25 {
        create_store(&app, 100 * i).await;
    }

    // Page 1, size 10: a full window and more pages remain.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/stores?page=1&size=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["total"].as_u64().unwrap(), 25);
    assert_eq!(body["has_next"], json!(true));

    // Page 3, size 10: the last 5 rows, no further pages.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/stores?page=3&size=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["total"].as_u64().unwrap(), 25);
    assert_eq!(body["has_next"], json!(false));

    // Page past the end: empty but well-formed.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/stores?page=4&size=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["has_next"], json!(false));
}

#[tokio::test(flavor = "multi_thread")]
async fn out_of_bounds_page_and_size_are_rejected() {
    let app = test_app().await;

    for uri in [
        "/api/v1/stores?page=0",
        "/api/v1/stores?size=0",
        "/api/v1/stores?size=101",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {}",
            uri
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn list_sorts_by_whitelisted_field() {
    let app = test_app().await;
    create_store(&app, 500).await;
    create_store(&app, 2000).await;
    create_store(&app, 1000).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/stores?sort=square_meters&order=desc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    let sizes: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["square_meters"].as_i64().unwrap())
        .collect();
    assert_eq!(sizes, vec![2000, 1000, 500]);

    // A field outside the whitelist falls back to key order, not an error.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/stores?sort=drop%20table&order=desc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_non_positive_area_is_rejected() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/stores")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "country": "Germany",
                        "state": "Bavaria",
                        "square_meters": 0,
                        "open_date": "2012-05-01"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_then_get_returns_not_found() {
    let app = test_app().await;
    let store = create_store(&app, 800).await;
    let key = store["store_key"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/stores/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/stores/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn patch_store_merges_fields() {
    let app = test_app().await;
    let store = create_store(&app, 800).await;
    let key = store["store_key"].as_i64().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/stores/{}", key))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"square_meters": 1200})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["square_meters"].as_i64().unwrap(), 1200);
    assert_eq!(body["country"], "Germany");
}
