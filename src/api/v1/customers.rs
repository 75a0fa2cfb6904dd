//! Customer handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::parse_sort_order;
use crate::api::AppState;
use crate::api::pagination::PageParams;
use crate::db::{Customer, DbError, ListParams};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// Error response DTO
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Customer not found")]
    pub error: String,
}

/// Customer response DTO
#[derive(Serialize, ToSchema)]
pub struct CustomerResponse {
    /// Generated key
    #[schema(example = 265598)]
    pub customer_key: i64,
    #[schema(example = "Julian Carter")]
    pub name: String,
    #[schema(example = "Male")]
    pub gender: String,
    #[schema(example = "Toronto")]
    pub city: String,
    #[schema(example = "ON")]
    pub state_code: String,
    #[schema(example = "Ontario")]
    pub state: String,
    #[schema(example = "M5V 2T6")]
    pub zip_code: String,
    #[schema(example = "Canada")]
    pub country: String,
    #[schema(example = "North America")]
    pub continent: String,
    /// Date of birth (YYYY-MM-DD)
    pub birthday: NaiveDate,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            customer_key: c.customer_key,
            name: c.name,
            gender: c.gender,
            city: c.city,
            state_code: c.state_code,
            state: c.state,
            zip_code: c.zip_code,
            country: c.country,
            continent: c.continent,
            birthday: c.birthday,
        }
    }
}

/// Create customer request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    #[schema(example = "Julian Carter")]
    pub name: String,
    #[schema(example = "Male")]
    pub gender: String,
    #[schema(example = "Toronto")]
    pub city: String,
    #[schema(example = "ON")]
    pub state_code: String,
    #[schema(example = "Ontario")]
    pub state: String,
    #[schema(example = "M5V 2T6")]
    pub zip_code: String,
    #[schema(example = "Canada")]
    pub country: String,
    #[schema(example = "North America")]
    pub continent: String,
    /// Date of birth (YYYY-MM-DD)
    pub birthday: NaiveDate,
}

impl CreateCustomerRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }

    fn into_customer(self) -> Customer {
        Customer {
            customer_key: 0, // Repository generates this
            name: self.name,
            gender: self.gender,
            city: self.city,
            state_code: self.state_code,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            continent: self.continent,
            birthday: self.birthday,
        }
    }
}

/// Full update request DTO (same shape as create, applied to an existing key)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: String,
    pub gender: String,
    pub city: String,
    pub state_code: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub continent: String,
    pub birthday: NaiveDate,
}

/// Partial update request DTO; only present fields are changed
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchCustomerRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl PatchCustomerRequest {
    fn merge_into(self, target: &mut Customer) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(gender) = self.gender {
            target.gender = gender;
        }
        if let Some(city) = self.city {
            target.city = city;
        }
        if let Some(state_code) = self.state_code {
            target.state_code = state_code;
        }
        if let Some(state) = self.state {
            target.state = state;
        }
        if let Some(zip_code) = self.zip_code {
            target.zip_code = zip_code;
        }
        if let Some(country) = self.country {
            target.country = country;
        }
        if let Some(continent) = self.continent {
            target.continent = continent;
        }
        if let Some(birthday) = self.birthday {
            target.birthday = birthday;
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCustomersQuery {
    /// 1-based page number
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[param(example = 20)]
    pub size: Option<u32>,
    /// Field to sort by (customer_key, name, city, country, birthday)
    #[param(example = "name")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "asc")]
    pub order: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedCustomers {
    pub items: Vec<CustomerResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_next: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// List customers
///
/// Returns one page of customers with the total count
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "customers",
    params(ListCustomersQuery),
    responses(
        (status = 200, description = "Paginated list of customers", body = PaginatedCustomers),
        (status = 400, description = "Page or size out of bounds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<PaginatedCustomers>, (StatusCode, Json<ErrorResponse>)> {
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

    let result = state.db().customers().list(&params).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(PaginatedCustomers {
        items: result.items.into_iter().map(CustomerResponse::from).collect(),
        total: result.total,
        page: page.page,
        size: page.size,
        has_next: page.has_next(result.total),
    }))
}

/// Get a customer by key
#[utoipa::path(
    get,
    path = "/api/v1/customers/{key}",
    tag = "customers",
    params(("key" = i64, Path, description = "Customer key")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    let customer = state.db().customers().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Customer {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), (StatusCode, Json<ErrorResponse>)> {
    req.validate()
        .map_err(|error| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })))?;

    let created = state
        .db()
        .customers()
        .create(&req.into_customer())
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(created))))
}

/// Replace a customer
#[utoipa::path(
    put,
    path = "/api/v1/customers/{key}",
    tag = "customers",
    params(("key" = i64, Path, description = "Customer key")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    let customer = Customer {
        customer_key: key,
        name: req.name,
        gender: req.gender,
        city: req.city,
        state_code: req.state_code,
        state: req.state,
        zip_code: req.zip_code,
        country: req.country,
        continent: req.continent,
        birthday: req.birthday,
    };

    state.db().customers().update(&customer).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Customer {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Partially update a customer
#[utoipa::path(
    patch,
    path = "/api/v1/customers/{key}",
    tag = "customers",
    params(("key" = i64, Path, description = "Customer key")),
    request_body = PatchCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_customer(
    State(state): State<AppState>,
    Path(key): Path<i64>,
    Json(req): Json<PatchCustomerRequest>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut customer = state.db().customers().get(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Customer {} not found", key),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    })?;

    req.merge_into(&mut customer);

    if customer.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "name must not be empty".into(),
            }),
        ));
    }

    state.db().customers().update(&customer).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{key}",
    tag = "customers",
    params(("key" = i64, Path, description = "Customer key")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Customer still referenced by sales", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(key): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.db().customers().delete(key).await.map_err(|e| match e {
        DbError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Customer {} not found", key),
            }),
        ),
        DbError::ForeignKey { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Customer {} is still referenced by sales", key),
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
