//! Sale handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::{ErrorResponse, parse_sort_order};
use crate::api::AppState;
use crate::api::pagination::PageParams;
use crate::db::{DbError, ListParams, Sale};

// =============================================================================
// DTOs
// =============================================================================

/// Sale response DTO (one order line)
#[derive(Serialize, ToSchema)]
pub struct SaleResponse {
    #[schema(example = 42)]
    pub sale_key: i64,
    #[schema(example = 366000)]
    pub order_number: i64,
    #[schema(example = 1)]
    pub line_item: i64,
    /// Order date (YYYY-MM-DD)
    pub order_date: NaiveDate,
    /// Delivery date, if delivered
    pub delivery_date: Option<NaiveDate>,
    #[schema(example = 265598)]
    pub customer_key: i64,
    #[schema(example = 10)]
    pub store_key: i64,
    #[schema(example = 1613)]
    pub product_key: i64,
    #[schema(example = 2)]
    pub quantity: i64,
    #[schema(example = "USD")]
    pub currency_code: String,
}

impl From<Sale> for SaleResponse {
    fn from(s: Sale) -> Self {
        Self {
            sale_key: s.sale_key,
            order_number: s.order_number,
            line_item: s.line_item,
            order_date: s.order_date,
            delivery_date: s.delivery_date,
            customer_key: s.customer_key,
            store_key: s.store_key,
            product_key: s.product_key,
            quantity: s.quantity,
            currency_code: s.currency_code,
        }
    }
}

/// Create sale request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    #[schema(example = 366000)]
    pub order_number: i64,
    #[schema(example = 1)]
    pub line_item: i64,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    #[schema(example = 265598)]
    pub customer_key: i64,
    #[schema(example = 10)]
    pub store_key: i64,
    #[schema(example = 1613)]
    pub product_key: i64,
    #[schema(example = 2)]
    pub quantity: i64,
    #[schema(example = "USD")]
    pub currency_code: String,
}

fn validate_sale(quantity: i64, line_item: i64, currency_code: &str) -> Result<(), String> {
    if quantity <= 0 {
        return Err("quantity must be positive".into());
    }
    if line_item < 1 {
        return Err("line_item must be at least 1".into());
    }
    if currency_code.len() != 3 || !currency_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("currency_code must be a 3-letter code".into());
    }
    Ok(())
}

/// Full update request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleRequest {
    pub order_number: i64,
    pub line_item: i64,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub customer_key: i64,
    pub store_key: i64,
    pub product_key: i64,
    pub quantity: i64,
    pub currency_code: String,
}

/// Partial update request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchSaleRequest {
    pub order_number: Option<i64>,
    pub line_item: Option<i64>,
    pub order_date: Option<NaiveDate>,
    /// Set to a date to mark delivered; absent fields stay unchanged
    pub delivery_date: Option<NaiveDate>,
    pub customer_key: Option<i64>,
    pub store_key: Option<i64>,
    pub product_key: Option<i64>,
    pub quantity: Option<i64>,
    pub currency_code: Option<String>,
}

impl PatchSaleRequest {
    fn merge_into(self, target: &mut Sale) {
        if let Some(order_number) = self.order_number {
            target.order_number = order_number;
        }
        if let Some(line_item) = self.line_item {
            target.line_item = line_item;
        }
        if let Some(order_date) = self.order_date {
            target.order_date = order_date;
        }
        if let Some(delivery_date) = self.delivery_date {
            target.delivery_date = Some(delivery_date);
        }
        if let Some(customer_key) = self.customer_key {
            target.customer_key = customer_key;
        }
        if let Some(store_key) = self.store_key {
            target.store_key = store_key;
        }
        if let Some(product_key) = self.product_key {
            target.product_key = product_key;
        }
        if let Some(quantity) = self.quantity {
            target.quantity = quantity;
        }
        if let Some(currency_code) = self.currency_code {
            target.currency_code = currency_code;
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSalesQuery {
    /// Restrict to one order number
    #[param(example = 366000)]
    pub order_number: Option<i64>,
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (sale_key, order_number, order_date, quantity, customer_key)
    #[param(example = "order_date")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "desc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedSales {
    pub items: Vec<SaleResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List sales
///
/// Optionally filtered to a single order number
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    tag = "sales",
    params(ListSalesQuery),
    responses(
        (status = 200, description = "Paginated list of sales", body = PaginatedSales),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<PaginatedSales>, (StatusCode, Json<ErrorResponse>)> {
    let page = PageParams::new(query.page, query.size).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let params = ListParams {
        limit: page.limit(),
        offset: page.offset(),
        sort_by: query.sort.clone(),
        sort_order: parse_sort_order(query.order.as_deref()),
    };

    let result = state
        .db()
        .sales()
        .list(&params, query.order_number)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(PaginatedSales {
        items: result.items.into_iter().map(SaleResponse::from).collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get a sale by key
#[utoipa::path(
    get,
    path = "/api/v1/sales/{key}",
    tag = "sales",
    params(("key" = i64, Path, description = "Sale key")),
    responses(
        (status = 200, description = "Sale found", body = SaleResponse),
        (status = 404, description = "Sale not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<SaleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let sale = state.db().sales().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Sale {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(SaleResponse::from(sale)))
}

/// Create a new sale
///
/// The referenced customer, store and product must all exist
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    tag = "sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale created", body = SaleResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 409, description = "Order line already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), (StatusCode, Json<ErrorResponse>)> {
    validate_sale(req.quantity, req.line_item, &req.currency_code)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let sale = Sale {
        sale_key: 0, // Repository generates this
        order_number: req.order_number,
        line_item: req.line_item,
        order_date: req.order_date,
        delivery_date: req.delivery_date,
        customer_key: req.customer_key,
        store_key: req.store_key,
        product_key: req.product_key,
        quantity: req.quantity,
        currency_code: req.currency_code.to_ascii_uppercase(),
    };

    let created = state.db().sales().create(&sale).await.map_err(|e| match e {
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        DbError::AlreadyExists { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from(created))))
}

/// Replace a sale
#[utoipa::path(
    put,
    path = "/api/v1/sales/{key}",
    tag = "sales",
    params(("key" = i64, Path, description = "Sale key")),
    request_body = UpdateSaleRequest,
    responses(
        (status = 200, description = "Sale updated", body = SaleResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 404, description = "Sale not found", body = ErrorResponse),
        (status = 409, description = "Order line already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sale(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<UpdateSaleRequest>,
) -> Result<Json<SaleResponse>, (StatusCode, Json<ErrorResponse>)> {
    validate_sale(req.quantity, req.line_item, &req.currency_code)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let sale = Sale {
        sale_key: key,
        order_number: req.order_number,
        line_item: req.line_item,
        order_date: req.order_date,
        delivery_date: req.delivery_date,
        customer_key: req.customer_key,
        store_key: req.store_key,
        product_key: req.product_key,
        quantity: req.quantity,
        currency_code: req.currency_code.to_ascii_uppercase(),
    };

    state.db().sales().update(&sale).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Sale {} not found", key),
            }),
        ),
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        DbError::AlreadyExists { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(SaleResponse::from(sale)))
}

/// Partially update a sale
#[utoipa::path(
    patch,
    path = "/api/v1/sales/{key}",
    tag = "sales",
    params(("key" = i64, Path, description = "Sale key")),
    request_body = PatchSaleRequest,
    responses(
        (status = 200, description = "Sale updated", body = SaleResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 404, description = "Sale not found", body = ErrorResponse),
        (status = 409, description = "Order line already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_sale(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<PatchSaleRequest>,
) -> Result<Json<SaleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut sale = state.db().sales().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Sale {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    req.merge_into(&mut sale);
    sale.currency_code = sale.currency_code.to_ascii_uppercase();

    validate_sale(sale.quantity, sale.line_item, &sale.currency_code)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    state.db().sales().update(&sale).await.map_err(|e| match e {
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        DbError::AlreadyExists { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(SaleResponse::from(sale)))
}

/// Delete a sale
#[utoipa::path(
    delete,
    path = "/api/v1/sales/{key}",
    tag = "sales",
    params(("key" = i64, Path, description = "Sale key")),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 404, description = "Sale not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().sales().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Sale {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(StatusCode::NO_CONTENT)
}
