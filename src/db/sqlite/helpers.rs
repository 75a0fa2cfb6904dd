//! Shared helper functions for SQLite repositories.

use crate::db::{ListParams, SortOrder};

/// Validate a sort field against the entity's whitelist.
/// Returns None for fields outside the whitelist (falls back to default).
pub fn validate_sort_field(field: &str, allowed: &[&'static str]) -> Option<&'static str> {
    allowed.iter().copied().find(|&a| a == field)
}

/// Build an ORDER BY clause from list parameters.
pub fn build_order_clause(
    params: &ListParams,
    allowed_fields: &[&'static str],
    default_field: &str,
) -> String {
    let sort_field = params
        .sort_by
        .as_deref()
        .and_then(|f| validate_sort_field(f, allowed_fields))
        .unwrap_or(default_field);

    let order = match params.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    format!("ORDER BY {} {}", sort_field, order)
}

/// Build a LIMIT/OFFSET clause from list parameters.
pub fn build_limit_offset_clause(params: &ListParams) -> String {
    format!("LIMIT {} OFFSET {}", params.limit, params.offset)
}
