//! Store handlers.

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
use crate::db::{DbError, ListParams, Store};

// =============================================================================
// DTOs
// =============================================================================

/// Store response DTO
#[derive(Serialize, ToSchema)]
pub struct StoreResponse {
    #[schema(example = 54)]
    pub store_key: i64,
    #[schema(example = "Germany")]
    pub country: String,
    #[schema(example = "Bavaria")]
    pub state: String,
    /// Floor area in square meters
    #[schema(example = 2000)]
    pub square_meters: i64,
    /// Opening date (YYYY-MM-DD)
    pub open_date: NaiveDate,
}

impl From<Store> for StoreResponse {
    fn from(s: Store) -> Self {
        Self {
            store_key: s.store_key,
            country: s.country,
            state: s.state,
            square_meters: s.square_meters,
            open_date: s.open_date,
        }
    }
}

/// Create store request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    #[schema(example = "Germany")]
    pub country: String,
    #[schema(example = "Bavaria")]
    pub state: String,
    #[schema(example = 2000)]
    pub square_meters: i64,
    pub open_date: NaiveDate,
}

impl CreateStoreRequest {
    fn validate(&self) -> Result<(), String> {
        if self.country.trim().is_empty() {
            return Err("country must not be empty".into());
        }
        if self.square_meters <= 0 {
            return Err("square_meters must be positive".into());
        }
        Ok(())
    }
}

/// Full update request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub country: String,
    pub state: String,
    pub square_meters: i64,
    pub open_date: NaiveDate,
}

/// Partial update request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchStoreRequest {
    pub country: Option<String>,
    pub state: Option<String>,
    pub square_meters: Option<i64>,
    pub open_date: Option<NaiveDate>,
}

impl PatchStoreRequest {
    fn merge_into(self, target: &mut Store) {
        if let Some(country) = self.country {
            target.country = country;
        }
        if let Some(state) = self.state {
            target.state = state;
        }
        if let Some(square_meters) = self.square_meters {
            target.square_meters = square_meters;
        }
        if let Some(open_date) = self.open_date {
            target.open_date = open_date;
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListStoresQuery {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (store_key, country, state, square_meters, open_date)
    #[param(example = "country")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "asc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedStores {
    pub items: Vec<StoreResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List stores
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    tag = "stores",
    params(ListStoresQuery),
    responses(
        (status = 200, description = "Paginated list of stores", body = PaginatedStores),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<ListStoresQuery>,
) -> Result<Json<PaginatedStores>, (StatusCode, Json<ErrorResponse>)> {
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

    let result = state.db().stores().list(&params).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(PaginatedStores {
        items: result.items.into_iter().map(StoreResponse::from).collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get a store by key
#[utoipa::path(
    get,
    path = "/api/v1/stores/{key}",
    tag = "stores",
    params(("key" = i64, Path, description = "Store key")),
    responses(
        (status = 200, description = "Store found", body = StoreResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_store(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<StoreResponse>, (StatusCode, Json<ErrorResponse>)> {
    let store = state.db().stores().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Store {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(StoreResponse::from(store)))
}

/// Create a new store
#[utoipa::path(
    post,
    path = "/api/v1/stores",
    tag = "stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = StoreResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_store(
    State(state): State<AppState>,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), (StatusCode, Json<ErrorResponse>)> {
    req.validate()
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let store = Store {
        store_key: 0, // Repository generates this
        country: req.country,
        state: req.state,
        square_meters: req.square_meters,
        open_date: req.open_date,
    };

    let created = state.db().stores().create(&store).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok((StatusCode::CREATED, Json(StoreResponse::from(created))))
}

/// Replace a store
#[utoipa::path(
    put,
    path = "/api/v1/stores/{key}",
    tag = "stores",
    params(("key" = i64, Path, description = "Store key")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_store(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.square_meters <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "square_meters must be positive".into(),
            }),
        ));
    }

    let store = Store {
        store_key: key,
        country: req.country,
        state: req.state,
        square_meters: req.square_meters,
        open_date: req.open_date,
    };

    state.db().stores().update(&store).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Store {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(StoreResponse::from(store)))
}

/// Partially update a store
#[utoipa::path(
    patch,
    path = "/api/v1/stores/{key}",
    tag = "stores",
    params(("key" = i64, Path, description = "Store key")),
    request_body = PatchStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_store(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<PatchStoreRequest>,
) -> Result<Json<StoreResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut store = state.db().stores().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Store {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    req.merge_into(&mut store);

    if store.square_meters <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "square_meters must be positive".into(),
            }),
        ));
    }

    state.db().stores().update(&store).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(StoreResponse::from(store)))
}

/// Delete a store
#[utoipa::path(
    delete,
    path = "/api/v1/stores/{key}",
    tag = "stores",
    params(("key" = i64, Path, description = "Store key")),
    responses(
        (status = 204, description = "Store deleted"),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 409, description = "Store still referenced by sales", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_store(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().stores().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Store {} not found", key),
            }),
        ),
        DbError::ForeignKey { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Store {} is still referenced by sales", key),
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
