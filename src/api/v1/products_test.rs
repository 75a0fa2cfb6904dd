//! Integration tests for Product API endpoints.

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

/// Seed one category with one subcategory; returns (category_key, subcategory_key).
async fn seed_catalog(app: &axum::Router) -> (i64, i64) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/categories")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"name": "Audio"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let category = json_body(response).await["category_key"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/categories/{}/subcategories", category))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"name": "MP3 Players"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let subcategory = json_body(response).await["subcategory_key"]
        .as_i64()
        .unwrap();

    (category, subcategory)
}

fn product_payload(category: i64, subcategory: i64) -> Value {
    json!({
        "product_name": "Contoso 512MB MP3 Player",
        "brand": "Contoso",
        "color": "Silver",
        "unit_cost_usd": 6.62,
        "unit_price_usd": 12.99,
        "category_key": category,
        "subcategory_key": subcategory
    })
}

async fn post_product(app: &axum::Router, payload: &Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/products")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_round_trips() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;

    let response = post_product(&app, &product_payload(category, subcategory)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let key = created["product_key"].as_i64().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/products/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = json_body(response).await;
    assert_eq!(fetched["product_name"], "Contoso 512MB MP3 Player");
    assert_eq!(fetched["unit_price_usd"].as_f64().unwrap(), 12.99);
    assert_eq!(fetched, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_missing_subcategory_is_rejected() {
    let app = test_app().await;
    let (category, _) = seed_catalog(&app).await;

    let response = post_product(&app, &product_payload(category, 999)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(
        body["error"].as_str().unwrap().contains("subcategory"),
        "error should name the bad reference: {}",
        body["error"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_subcategory_of_other_category_is_rejected() {
    let app = test_app().await;
    let (_, subcategory) = seed_catalog(&app).await;

    // A second, unrelated category.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/categories")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"name": "Cameras"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let other = json_body(response).await["category_key"].as_i64().unwrap();

    let response = post_product(&app, &product_payload(other, subcategory)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("does not belong"));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_positive_prices_are_rejected() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;

    let mut payload = product_payload(category, subcategory);
    payload["unit_price_usd"] = json!(0.0);
    let response = post_product(&app, &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut payload = product_payload(category, subcategory);
    payload["unit_cost_usd"] = json!(-1.5);
    let response = post_product(&app, &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn patch_merges_and_revalidates() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;
    let created = json_body(post_product(&app, &product_payload(category, subcategory)).await).await;
    let key = created["product_key"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/products/{}", key))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"color": "Black", "unit_price_usd": 9.99})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["color"], "Black");
    assert_eq!(body["unit_price_usd"].as_f64().unwrap(), 9.99);
    assert_eq!(body["brand"], "Contoso");

    // Patching in a bad price is still rejected.
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/products/{}", key))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"unit_price_usd": -2.0})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_missing_product_returns_not_found() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/products/999")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&product_payload(category, subcategory)).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_then_get_returns_not_found() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;
    let created = json_body(post_product(&app, &product_payload(category, subcategory)).await).await;
    let key = created["product_key"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/products/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/products/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_referenced_subcategory_is_refused() {
    let app = test_app().await;
    let (category, subcategory) = seed_catalog(&app).await;
    json_body(post_product(&app, &product_payload(category, subcategory)).await).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/subcategories/{}", subcategory))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
