//! Store repository.

use sqlx::SqlitePool;

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{DbError, DbResult, ListParams, ListResult, Store};

const SORT_FIELDS: &[&str] = &["store_key", "country", "state", "square_meters", "open_date"];

pub struct StoreRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> StoreRepository<'a> {
    pub async fn create(&self, store: &Store) -> DbResult<Store> {
        let result = sqlx::query(
            "INSERT INTO store (country, state, square_meters, open_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&store.country)
        .bind(&store.state)
        .bind(store.square_meters)
        .bind(store.open_date)
        .execute(self.pool)
        .await?;

        Ok(Store {
            store_key: result.last_insert_rowid(),
            ..store.clone()
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM store WHERE store_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Store", key))
    }

    pub async fn list(&self, params: &ListParams) -> DbResult<ListResult<Store>> {
        let order = build_order_clause(params, SORT_FIELDS, "store_key");
        let window = build_limit_offset_clause(params);

        let items =
            sqlx::query_as::<_, Store>(&format!("SELECT * FROM store {} {}", order, window))
                .fetch_all(self.pool)
                .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store")
            .fetch_one(self.pool)
            .await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, store: &Store) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE store SET country = ?, state = ?, square_meters = ?, open_date = ? \
             WHERE store_key = ?",
        )
        .bind(&store.country)
        .bind(&store.state)
        .bind(store.square_meters)
        .bind(store.open_date)
        .bind(store.store_key)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", store.store_key));
        }
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM store WHERE store_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", key));
        }
        Ok(())
    }
}
