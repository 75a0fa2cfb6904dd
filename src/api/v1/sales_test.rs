//! Integration tests for Sale API endpoints, including reference
//! validation.

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

async fn post(app: &axum::Router, uri: &str, payload: &Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Seed a customer, store and product; returns their keys.
async fn seed_world(app: &axum::Router) -> (i64, i64, i64) {
    let customer = json_body(
        post(
            app,
            "/api/v1/customers",
            &json!({
                "name": "Julian Carter",
                "gender": "Male",
                "city": "Toronto",
                "state_code": "ON",
                "state": "Ontario",
                "zip_code": "M5V 2T6",
                "country": "Canada",
                "continent": "North America",
                "birthday": "1987-03-14"
            }),
        )
        .await,
    )
    .await["customer_key"]
        .as_i64()
        .unwrap();

    let store = json_body(
        post(
            app,
            "/api/v1/stores",
            &json!({
                "country": "Canada",
                "state": "Ontario",
                "square_meters": 1500,
                "open_date": "2010-01-01"
            }),
        )
        .await,
    )
    .await["store_key"]
        .as_i64()
        .unwrap();

    let category = json_body(post(app, "/api/v1/categories", &json!({"name": "Audio"})).await)
        .await["category_key"]
        .as_i64()
        .unwrap();
    let subcategory = json_body(
        post(
            app,
            &format!("/api/v1/categories/{}/subcategories", category),
            &json!({"name": "MP3 Players"}),
        )
        .await,
    )
    .await["subcategory_key"]
        .as_i64()
        .unwrap();
    let product = json_body(
        post(
            app,
            "/api/v1/products",
            &json!({
                "product_name": "Contoso 512MB MP3 Player",
                "brand": "Contoso",
                "color": "Silver",
                "unit_cost_usd": 6.62,
                "unit_price_usd": 12.99,
                "category_key": category,
                "subcategory_key": subcategory
            }),
        )
        .await,
    )
    .await["product_key"]
        .as_i64()
        .unwrap();

    (customer, store, product)
}

fn sale_payload(customer: i64, store: i64, product: i64) -> Value {
    json!({
        "order_number": 366000,
        "line_item": 1,
        "order_date": "2020-02-18",
        "delivery_date": null,
        "customer_key": customer,
        "store_key": store,
        "product_key": product,
        "quantity": 2,
        "currency_code": "usd"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_round_trips() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;

    let response = post(&app, "/api/v1/sales", &sale_payload(customer, store, product)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let key = created["sale_key"].as_i64().unwrap();
    // Currency codes are stored uppercased.
    assert_eq!(created["currency_code"], "USD");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/sales/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn sale_referencing_missing_product_is_rejected_without_insert() {
    let app = test_app().await;
    let (customer, store, _) = seed_world(&app).await;

    let response = post(&app, "/api/v1/sales", &sale_payload(customer, store, 999)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(
        body["error"].as_str().unwrap().contains("product"),
        "error should name the bad reference: {}",
        body["error"]
    );

    // No silent insert.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/sales")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await["total"].as_u64().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_order_line_is_a_conflict() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;

    let payload = sale_payload(customer, store, product);
    assert_eq!(
        post(&app, "/api/v1/sales", &payload).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        post(&app, "/api/v1/sales", &payload).await.status(),
        StatusCode::CONFLICT
    );

    // A second line of the same order is fine.
    let mut second_line = sale_payload(customer, store, product);
    second_line["line_item"] = json!(2);
    assert_eq!(
        post(&app, "/api/v1/sales", &second_line).await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_order_number() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;

    let mut payload = sale_payload(customer, store, product);
    assert_eq!(
        post(&app, "/api/v1/sales", &payload).await.status(),
        StatusCode::CREATED
    );
    payload["order_number"] = json!(366001);
    assert_eq!(
        post(&app, "/api/v1/sales", &payload).await.status(),
        StatusCode::CREATED
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/sales?order_number=366001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"].as_u64().unwrap(), 1);
    assert_eq!(body["items"][0]["order_number"].as_i64().unwrap(), 366001);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_positive_quantity_is_rejected() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;

    let mut payload = sale_payload(customer, store, product);
    payload["quantity"] = json!(0);
    assert_eq!(
        post(&app, "/api/v1/sales", &payload).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn patch_marks_delivery() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;
    let created = json_body(
        post(&app, "/api/v1/sales", &sale_payload(customer, store, product)).await,
    )
    .await;
    let key = created["sale_key"].as_i64().unwrap();
    assert_eq!(created["delivery_date"], Value::Null);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/sales/{}", key))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"delivery_date": "2020-02-25", "quantity": 3}))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["delivery_date"], "2020-02-25");
    assert_eq!(body["quantity"].as_i64().unwrap(), 3);
    assert_eq!(body["order_number"].as_i64().unwrap(), 366000);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_missing_sale_returns_not_found() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/sales/999")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&sale_payload(customer, store, product)).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_customer_with_sales_is_refused() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;
    assert_eq!(
        post(&app, "/api/v1/sales", &sale_payload(customer, store, product))
            .await
            .status(),
        StatusCode::CREATED
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/customers/{}", customer))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_then_get_returns_not_found() {
    let app = test_app().await;
    let (customer, store, product) = seed_world(&app).await;
    let created = json_body(
        post(&app, "/api/v1/sales", &sale_payload(customer, store, product)).await,
    )
    .await;
    let key = created["sale_key"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/sales/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/sales/{}", key))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
