//! V1 API handlers.

mod categories;
mod customers;
mod exchange_rates;
mod products;
mod sales;
mod stores;
mod system;

#[cfg(test)]
mod exchange_rates_test;
#[cfg(test)]
mod products_test;
#[cfg(test)]
mod sales_test;
#[cfg(test)]
mod stores_test;

pub use categories::*;
pub use customers::*;
pub use exchange_rates::*;
pub use products::*;
pub use sales::*;
pub use stores::*;
pub use system::*;

use crate::db::SortOrder;

/// Map the `order` query parameter; anything unrecognized falls back to
/// ascending.
pub(crate) fn parse_sort_order(order: Option<&str>) -> SortOrder {
    match order {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    }
}
