//! Integration tests for ExchangeRate API endpoints, including the
//! duplicate-rejection policy.

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

async fn post_rate(app: &axum::Router, payload: &Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/exchange-rates")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_by_currency_and_date() {
    let app = test_app().await;

    let response = post_rate(
        &app,
        &json!({"currency_code": "EUR", "date": "2020-01-15", "rate": 0.9232}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates/EUR/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["currency_code"], "EUR");
    assert_eq!(body["date"], "2020-01-15");
    assert_eq!(body["rate"].as_f64().unwrap(), 0.9232);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_pair_is_rejected_and_original_kept() {
    let app = test_app().await;

    let first = json!({"currency_code": "EUR", "date": "2020-01-15", "rate": 0.9232});
    assert_eq!(post_rate(&app, &first).await.status(), StatusCode::CREATED);

    // Second rate for the same (currency, date): rejected, never overwritten.
    let second = json!({"currency_code": "EUR", "date": "2020-01-15", "rate": 0.95});
    assert_eq!(post_rate(&app, &second).await.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates/EUR/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["rate"].as_f64().unwrap(), 0.9232);
}

#[tokio::test(flavor = "multi_thread")]
async fn same_currency_other_date_is_fine() {
    let app = test_app().await;

    assert_eq!(
        post_rate(
            &app,
            &json!({"currency_code": "EUR", "date": "2020-01-15", "rate": 0.9232})
        )
        .await
        .status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post_rate(
            &app,
            &json!({"currency_code": "EUR", "date": "2020-01-16", "rate": 0.9251})
        )
        .await
        .status(),
        StatusCode::CREATED
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn non_positive_rate_is_rejected() {
    let app = test_app().await;

    for rate in [0.0, -1.2] {
        let response = post_rate(
            &app,
            &json!({"currency_code": "EUR", "date": "2020-01-15", "rate": rate}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_currency_code_is_rejected() {
    let app = test_app().await;

    for currency in ["EURO", "E", "12$"] {
        let response = post_rate(
            &app,
            &json!({"currency_code": currency, "date": "2020-01-15", "rate": 0.9}),
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for currency {:?}",
            currency
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn currency_is_normalized_to_uppercase() {
    let app = test_app().await;

    let response = post_rate(
        &app,
        &json!({"currency_code": "cad", "date": "2020-01-15", "rate": 1.3239}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["currency_code"], "CAD");

    // Lookup is case-insensitive through the same normalization.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates/cad/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn put_and_patch_change_the_rate() {
    let app = test_app().await;
    post_rate(
        &app,
        &json!({"currency_code": "GBP", "date": "2020-01-15", "rate": 0.7665}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/exchange-rates/GBP/2020-01-15")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json!({"rate": 0.77})).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["rate"].as_f64().unwrap(), 0.77);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/v1/exchange-rates/GBP/2020-01-15")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"rate": 0.78})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates/GBP/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await["rate"].as_f64().unwrap(), 0.78);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_missing_pair_returns_not_found() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/exchange-rates/JPY/2020-01-15")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json!({"rate": 110.0})).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_then_get_returns_not_found() {
    let app = test_app().await;
    post_rate(
        &app,
        &json!({"currency_code": "AUD", "date": "2020-01-15", "rate": 1.4527}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/exchange-rates/AUD/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates/AUD/2020-01-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_currency() {
    let app = test_app().await;
    post_rate(
        &app,
        &json!({"currency_code": "EUR", "date": "2020-01-15", "rate": 0.9232}),
    )
    .await;
    post_rate(
        &app,
        &json!({"currency_code": "EUR", "date": "2020-01-16", "rate": 0.9251}),
    )
    .await;
    post_rate(
        &app,
        &json!({"currency_code": "CAD", "date": "2020-01-15", "rate": 1.3239}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates?currency=EUR")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"].as_u64().unwrap(), 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exchange-rates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await["total"].as_u64().unwrap(), 3);
}
