//! Domain models for the retailer database.
//!
//! These are the rows as stored, independent of the HTTP DTOs. Calendar
//! fields are `chrono::NaiveDate` and serialize as `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Window and ordering applied to a list query.
///
/// Offset/limit are already resolved from page/size by the API layer; the
/// sort field is validated against a per-entity whitelist in the repository.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

/// Result of a paginated list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    /// The items in this window.
    pub items: Vec<T>,
    /// Total count of all matching rows (before the window).
    pub total: u64,
}

/// A retail customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub customer_key: i64,
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

/// A top-level product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub category_key: i64,
    pub name: String,
}

/// A subcategory, always owned by a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subcategory {
    pub subcategory_key: i64,
    pub name: String,
    pub category_key: i64,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_key: i64,
    pub product_name: String,
    pub brand: String,
    pub color: String,
    pub unit_cost_usd: f64,
    pub unit_price_usd: f64,
    pub category_key: i64,
    pub subcategory_key: i64,
}

/// A physical store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    pub store_key: i64,
    pub country: String,
    pub state: String,
    pub square_meters: i64,
    pub open_date: NaiveDate,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub sale_key: i64,
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

/// Daily exchange rate against USD. Natural key: (currency_code, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExchangeRate {
    pub currency_code: String,
    pub date: NaiveDate,
    pub rate: f64,
}
