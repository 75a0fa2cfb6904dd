//! Product handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::{ErrorResponse, parse_sort_order};
use crate::api::AppState;
use crate::api::pagination::PageParams;
use crate::db::{DbError, ListParams, Product};

// =============================================================================
// DTOs
// =============================================================================

/// Product response DTO
#[derive(Serialize, ToSchema)]
pub struct ProductResponse {
    #[schema(example = 1613)]
    pub product_key: i64,
    #[schema(example = "Contoso 512MB MP3 Player")]
    pub product_name: String,
    #[schema(example = "Contoso")]
    pub brand: String,
    #[schema(example = "Silver")]
    pub color: String,
    #[schema(example = 6.62)]
    pub unit_cost_usd: f64,
    #[schema(example = 12.99)]
    pub unit_price_usd: f64,
    #[schema(example = 3)]
    pub category_key: i64,
    #[schema(example = 17)]
    pub subcategory_key: i64,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            product_key: p.product_key,
            product_name: p.product_name,
            brand: p.brand,
            color: p.color,
            unit_cost_usd: p.unit_cost_usd,
            unit_price_usd: p.unit_price_usd,
            category_key: p.category_key,
            subcategory_key: p.subcategory_key,
        }
    }
}

/// Create product request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Contoso 512MB MP3 Player")]
    pub product_name: String,
    #[schema(example = "Contoso")]
    pub brand: String,
    #[schema(example = "Silver")]
    pub color: String,
    #[schema(example = 6.62)]
    pub unit_cost_usd: f64,
    #[schema(example = 12.99)]
    pub unit_price_usd: f64,
    #[schema(example = 3)]
    pub category_key: i64,
    #[schema(example = 17)]
    pub subcategory_key: i64,
}

fn validate_product(name: &str, cost: f64, price: f64) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("product_name must not be empty".into());
    }
    if !cost.is_finite() || cost <= 0.0 {
        return Err("unit_cost_usd must be positive".into());
    }
    if !price.is_finite() || price <= 0.0 {
        return Err("unit_price_usd must be positive".into());
    }
    Ok(())
}

/// Full update request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub product_name: String,
    pub brand: String,
    pub color: String,
    pub unit_cost_usd: f64,
    pub unit_price_usd: f64,
    pub category_key: i64,
    pub subcategory_key: i64,
}

/// Partial update request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchProductRequest {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub unit_cost_usd: Option<f64>,
    pub unit_price_usd: Option<f64>,
    pub category_key: Option<i64>,
    pub subcategory_key: Option<i64>,
}

impl PatchProductRequest {
    fn merge_into(self, target: &mut Product) {
        if let Some(product_name) = self.product_name {
            target.product_name = product_name;
        }
        if let Some(brand) = self.brand {
            target.brand = brand;
        }
        if let Some(color) = self.color {
            target.color = color;
        }
        if let Some(unit_cost_usd) = self.unit_cost_usd {
            target.unit_cost_usd = unit_cost_usd;
        }
        if let Some(unit_price_usd) = self.unit_price_usd {
            target.unit_price_usd = unit_price_usd;
        }
        if let Some(category_key) = self.category_key {
            target.category_key = category_key;
        }
        if let Some(subcategory_key) = self.subcategory_key {
            target.subcategory_key = subcategory_key;
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProductsQuery {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (product_key, product_name, brand, unit_price_usd, unit_cost_usd)
    #[param(example = "product_name")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "asc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedProducts {
    pub items: Vec<ProductResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Paginated list of products", body = PaginatedProducts),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<PaginatedProducts>, (StatusCode, Json<ErrorResponse>)> {
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

    let result = state.db().products().list(&params).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(PaginatedProducts {
        items: result.items.into_iter().map(ProductResponse::from).collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get a product by key
#[utoipa::path(
    get,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = i64, Path, description = "Product key")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product = state.db().products().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Product {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(ProductResponse::from(product)))
}

/// Create a new product
///
/// The category and subcategory must exist, and the subcategory must belong
/// to the category
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), (StatusCode, Json<ErrorResponse>)> {
    validate_product(&req.product_name, req.unit_cost_usd, req.unit_price_usd)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let product = Product {
        product_key: 0, // Repository generates this
        product_name: req.product_name,
        brand: req.brand,
        color: req.color,
        unit_cost_usd: req.unit_cost_usd,
        unit_price_usd: req.unit_price_usd,
        category_key: req.category_key,
        subcategory_key: req.subcategory_key,
    };

    let created = state.db().products().create(&product).await.map_err(|e| match e {
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
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

    Ok((StatusCode::CREATED, Json(ProductResponse::from(created))))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = i64, Path, description = "Product key")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<ErrorResponse>)> {
    validate_product(&req.product_name, req.unit_cost_usd, req.unit_price_usd)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let product = Product {
        product_key: key,
        product_name: req.product_name,
        brand: req.brand,
        color: req.color,
        unit_cost_usd: req.unit_cost_usd,
        unit_price_usd: req.unit_price_usd,
        category_key: req.category_key,
        subcategory_key: req.subcategory_key,
    };

    state.db().products().update(&product).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Product {} not found", key),
            }),
        ),
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
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

    Ok(Json(ProductResponse::from(product)))
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = i64, Path, description = "Product key")),
    request_body = PatchProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid payload or reference", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_product(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<PatchProductRequest>,
) -> Result<Json<ProductResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut product = state.db().products().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Product {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    req.merge_into(&mut product);

    validate_product(
        &product.product_name,
        product.unit_cost_usd,
        product.unit_price_usd,
    )
    .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    state.db().products().update(&product).await.map_err(|e| match e {
        DbError::Validation { .. } | DbError::ForeignKey { .. } => (
            StatusCode::BAD_REQUEST,
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

    Ok(Json(ProductResponse::from(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = i64, Path, description = "Product key")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product still referenced by sales", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().products().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Product {} not found", key),
            }),
        ),
        DbError::ForeignKey { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Product {} is still referenced by sales", key),
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
