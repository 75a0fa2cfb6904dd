//! Category and subcategory handlers.
//!
//! Subcategories are listed/created under their category
//! (`/categories/{key}/subcategories`) and addressed directly for
//! get/update/delete (`/subcategories/{key}`).

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
use crate::db::{Category, DbError, ListParams, Subcategory};

// =============================================================================
// DTOs
// =============================================================================

/// Category response DTO
#[derive(Serialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(example = 3)]
    pub category_key: i64,
    #[schema(example = "Computers")]
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            category_key: c.category_key,
            name: c.name,
        }
    }
}

/// Subcategory response DTO
#[derive(Serialize, ToSchema)]
pub struct SubcategoryResponse {
    #[schema(example = 17)]
    pub subcategory_key: i64,
    #[schema(example = "Laptops")]
    pub name: String,
    #[schema(example = 3)]
    pub category_key: i64,
}

impl From<Subcategory> for SubcategoryResponse {
    fn from(s: Subcategory) -> Self {
        Self {
            subcategory_key: s.subcategory_key,
            name: s.name,
            category_key: s.category_key,
        }
    }
}

/// Create/update category request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    #[schema(example = "Computers")]
    pub name: String,
}

/// Create subcategory request DTO (category comes from the path)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubcategoryRequest {
    #[schema(example = "Laptops")]
    pub name: String,
}

/// Full subcategory update: rename and/or move to another category
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubcategoryRequest {
    #[schema(example = "Laptops")]
    pub name: String,
    #[schema(example = 3)]
    pub category_key: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (category_key, name)
    #[param(example = "name")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "asc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedCategories {
    pub items: Vec<CategoryResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedSubcategories {
    pub items: Vec<SubcategoryResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Category handlers
// =============================================================================

/// List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Paginated list of categories", body = PaginatedCategories),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<PaginatedCategories>, (StatusCode, Json<ErrorResponse>)> {
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

    let result = state.db().categories().list(&params).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(PaginatedCategories {
        items: result.items.into_iter().map(CategoryResponse::from).collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get a category by key
#[utoipa::path(
    get,
    path = "/api/v1/categories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Category key")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<CategoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = state.db().categories().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Category {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(CategoryResponse::from(category)))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    let category = Category {
        category_key: 0, // Repository generates this
        name: req.name,
    };

    let created = state.db().categories().create(&category).await.map_err(|e| match e {
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

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(created))))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Category key")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    let category = Category {
        category_key: key,
        name: req.name,
    };

    state.db().categories().update(&category).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Category {} not found", key),
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

    Ok(Json(CategoryResponse::from(category)))
}

/// Delete a category
///
/// Refused while subcategories still reference it
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Category key")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still has subcategories", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().categories().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Category {} not found", key),
            }),
        ),
        DbError::ForeignKey { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Category {} still has subcategories or products", key),
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

// =============================================================================
// Subcategory handlers
// =============================================================================

/// List the subcategories of a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{key}/subcategories",
    tag = "categories",
    params(
        ("key" = i64, Path, description = "Category key"),
        ListCategoriesQuery
    ),
    responses(
        (status = 200, description = "Paginated list of subcategories", body = PaginatedSubcategories),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<PaginatedSubcategories>, (StatusCode, Json<ErrorResponse>)> {
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
        .subcategories()
        .list_by_category(key, &params)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Category {} not found", key),
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
        })?;

    Ok(Json(PaginatedSubcategories {
        items: result
            .items
            .into_iter()
            .map(SubcategoryResponse::from)
            .collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Create a subcategory under a category
#[utoipa::path(
    post,
    path = "/api/v1/categories/{key}/subcategories",
    tag = "categories",
    params(("key" = i64, Path, description = "Category key")),
    request_body = CreateSubcategoryRequest,
    responses(
        (status = 201, description = "Subcategory created", body = SubcategoryResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<CreateSubcategoryRequest>,
) -> Result<(StatusCode, Json<SubcategoryResponse>), (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    let subcategory = Subcategory {
        subcategory_key: 0, // Repository generates this
        name: req.name,
        category_key: key,
    };

    let created = state
        .db()
        .subcategories()
        .create(&subcategory)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Category {} not found", key),
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
        })?;

    Ok((StatusCode::CREATED, Json(SubcategoryResponse::from(created))))
}

/// Get a subcategory by key
#[utoipa::path(
    get,
    path = "/api/v1/subcategories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Subcategory key")),
    responses(
        (status = 200, description = "Subcategory found", body = SubcategoryResponse),
        (status = 404, description = "Subcategory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<SubcategoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let subcategory = state.db().subcategories().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Subcategory {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(SubcategoryResponse::from(subcategory)))
}

/// Replace a subcategory (rename or move to another category)
#[utoipa::path(
    put,
    path = "/api/v1/subcategories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Subcategory key")),
    request_body = UpdateSubcategoryRequest,
    responses(
        (status = 200, description = "Subcategory updated", body = SubcategoryResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Subcategory or target category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<UpdateSubcategoryRequest>,
) -> Result<Json<SubcategoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    let subcategory = Subcategory {
        subcategory_key: key,
        name: req.name,
        category_key: req.category_key,
    };

    state.db().subcategories().update(&subcategory).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
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

    Ok(Json(SubcategoryResponse::from(subcategory)))
}

/// Delete a subcategory
#[utoipa::path(
    delete,
    path = "/api/v1/subcategories/{key}",
    tag = "categories",
    params(("key" = i64, Path, description = "Subcategory key")),
    responses(
        (status = 204, description = "Subcategory deleted"),
        (status = 404, description = "Subcategory not found", body = ErrorResponse),
        (status = 409, description = "Subcategory still referenced by products", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().subcategories().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Subcategory {} not found", key),
            }),
        ),
        DbError::ForeignKey { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Subcategory {} is still referenced by products", key),
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
