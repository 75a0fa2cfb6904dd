//! Exchange rate handlers.
//!
//! Rates are addressed by their natural key: currency code plus date
//! (`/exchange-rates/{currency}/{date}`). Posting a second rate for the same
//! pair is a conflict; changing a rate goes through PUT or PATCH.

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
use crate::db::{DbError, ExchangeRate, ListParams};

// =============================================================================
// DTOs
// =============================================================================

/// Exchange rate response DTO
#[derive(Serialize, ToSchema)]
pub struct ExchangeRateResponse {
    #[schema(example = "EUR")]
    pub currency_code: String,
    /// Rate date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Units of the currency per USD
    #[schema(example = 0.9232)]
    pub rate: f64,
}

impl From<ExchangeRate> for ExchangeRateResponse {
    fn from(r: ExchangeRate) -> Self {
        Self {
            currency_code: r.currency_code,
            date: r.date,
            rate: r.rate,
        }
    }
}

/// Create exchange rate request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExchangeRateRequest {
    #[schema(example = "EUR")]
    pub currency_code: String,
    pub date: NaiveDate,
    #[schema(example = 0.9232)]
    pub rate: f64,
}

fn validate_currency(currency: &str) -> Result<(), String> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("currency_code must be a 3-letter code".into());
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<(), String> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err("rate must be positive".into());
    }
    Ok(())
}

/// Full update request DTO (the key comes from the path, only the rate moves)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExchangeRateRequest {
    #[schema(example = 0.9232)]
    pub rate: f64,
}

/// Partial update request DTO
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchExchangeRateRequest {
    #[schema(example = 0.9232)]
    pub rate: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListExchangeRatesQuery {
    /// Restrict to one currency
    #[param(example = "EUR")]
    pub currency: Option<String>,
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (currency_code, date, rate)
    #[param(example = "date")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "desc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedExchangeRates {
    pub items: Vec<ExchangeRateResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List exchange rates
///
/// Optionally filtered to a single currency
#[utoipa::path(
    get,
    path = "/api/v1/exchange-rates",
    tag = "exchange-rates",
    params(ListExchangeRatesQuery),
    responses(
        (status = 200, description = "Paginated list of rates", body = PaginatedExchangeRates),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_exchange_rates(
    State(state): State<AppState>,
    Query(query): Query<ListExchangeRatesQuery>,
) -> Result<Json<PaginatedExchangeRates>, (StatusCode, Json<ErrorResponse>)> {
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

    let currency = query.currency.as_deref().map(str::to_ascii_uppercase);
    let result = state
        .db()
        .exchange_rates()
        .list(&params, currency.as_deref())
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(PaginatedExchangeRates {
        items: result
            .items
            .into_iter()
            .map(ExchangeRateResponse::from)
            .collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get the rate for a currency on a date
#[utoipa::path(
    get,
    path = "/api/v1/exchange-rates/{currency}/{date}",
    tag = "exchange-rates",
    params(
        ("currency" = String, Path, description = "3-letter currency code"),
        ("date" = String, Path, description = "Rate date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Rate found", body = ExchangeRateResponse),
        (status = 404, description = "No rate for that currency and date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_exchange_rate(
    State(state): State<AppState>,
    Path((currency, date)): Path<(String, NaiveDate)>,
) -> Result<Json<ExchangeRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let currency = currency.to_ascii_uppercase();
    let rate = state
        .db()
        .exchange_rates()
        .get(&currency, date)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("No rate for {} on {}", currency, date),
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
        })?;

    Ok(Json(ExchangeRateResponse::from(rate)))
}

/// Create a new exchange rate
///
/// One rate per (currency, date): a duplicate is rejected, never overwritten
#[utoipa::path(
    post,
    path = "/api/v1/exchange-rates",
    tag = "exchange-rates",
    request_body = CreateExchangeRateRequest,
    responses(
        (status = 201, description = "Rate created", body = ExchangeRateResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Rate already exists for that currency and date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_exchange_rate(
    State(state): State<AppState>,
    Json(req): Json<CreateExchangeRateRequest>,
) -> Result<(StatusCode, Json<ExchangeRateResponse>), (StatusCode, Json<ErrorResponse>)> {
    validate_currency(&req.currency_code)
        .and_then(|_| validate_rate(req.rate))
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let rate = ExchangeRate {
        currency_code: req.currency_code.to_ascii_uppercase(),
        date: req.date,
        rate: req.rate,
    };

    let created = state
        .db()
        .exchange_rates()
        .create(&rate)
        .await
        .map_err(|e| match e {
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

    Ok((
        StatusCode::CREATED,
        Json(ExchangeRateResponse::from(created)),
    ))
}

/// Replace the rate for a currency on a date
#[utoipa::path(
    put,
    path = "/api/v1/exchange-rates/{currency}/{date}",
    tag = "exchange-rates",
    params(
        ("currency" = String, Path, description = "3-letter currency code"),
        ("date" = String, Path, description = "Rate date (YYYY-MM-DD)")
    ),
    request_body = UpdateExchangeRateRequest,
    responses(
        (status = 200, description = "Rate updated", body = ExchangeRateResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No rate for that currency and date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_exchange_rate(
    State(state): State<AppState>,
    Path((currency, date)): Path<(String, NaiveDate)>,
    Json(req): Json<UpdateExchangeRateRequest>,
) -> Result<Json<ExchangeRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    validate_rate(req.rate)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let rate = ExchangeRate {
        currency_code: currency.to_ascii_uppercase(),
        date,
        rate: req.rate,
    };

    state
        .db()
        .exchange_rates()
        .update(&rate)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("No rate for {} on {}", rate.currency_code, date),
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
        })?;

    Ok(Json(ExchangeRateResponse::from(rate)))
}

/// Partially update the rate for a currency on a date
#[utoipa::path(
    patch,
    path = "/api/v1/exchange-rates/{currency}/{date}",
    tag = "exchange-rates",
    params(
        ("currency" = String, Path, description = "3-letter currency code"),
        ("date" = String, Path, description = "Rate date (YYYY-MM-DD)")
    ),
    request_body = PatchExchangeRateRequest,
    responses(
        (status = 200, description = "Rate updated", body = ExchangeRateResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No rate for that currency and date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_exchange_rate(
    State(state): State<AppState>,
    Path((currency, date)): Path<(String, NaiveDate)>,
    Json(req): Json<PatchExchangeRateRequest>,
) -> Result<Json<ExchangeRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let currency = currency.to_ascii_uppercase();
    let mut rate = state
        .db()
        .exchange_rates()
        .get(&currency, date)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("No rate for {} on {}", currency, date),
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
        })?;

    if let Some(value) = req.rate {
        rate.rate = value;
    }

    validate_rate(rate.rate)
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    state
        .db()
        .exchange_rates()
        .update(&rate)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(ExchangeRateResponse::from(rate)))
}

/// Delete the rate for a currency on a date
#[utoipa::path(
    delete,
    path = "/api/v1/exchange-rates/{currency}/{date}",
    tag = "exchange-rates",
    params(
        ("currency" = String, Path, description = "3-letter currency code"),
        ("date" = String, Path, description = "Rate date (YYYY-MM-DD)")
    ),
    responses(
        (status = 204, description = "Rate deleted"),
        (status = 404, description = "No rate for that currency and date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_exchange_rate(
    State(state): State<AppState>,
    Path((currency, date)): Path<(String, NaiveDate)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let currency = currency.to_ascii_uppercase();
    state
        .db()
        .exchange_rates()
        .delete(&currency, date)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("No rate for {} on {}", currency, date),
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
