//! Product repository.
//!
//! Writes verify the category/subcategory references inside the same
//! transaction as the insert or update, so a failed check never leaves a
//! partial row behind.

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{DbError, DbResult, ListParams, ListResult, Product};

const SORT_FIELDS: &[&str] = &[
    "product_key",
    "product_name",
    "brand",
    "unit_price_usd",
    "unit_cost_usd",
];

pub struct ProductRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub async fn create(&self, product: &Product) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, product.category_key, product.subcategory_key).await?;

        let result = sqlx::query(
            "INSERT INTO product (product_name, brand, color, unit_cost_usd, unit_price_usd, \
             category_key, subcategory_key) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.product_name)
        .bind(&product.brand)
        .bind(&product.color)
        .bind(product.unit_cost_usd)
        .bind(product.unit_price_usd)
        .bind(product.category_key)
        .bind(product.subcategory_key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Product {
            product_key: result.last_insert_rowid(),
            ..product.clone()
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM product WHERE product_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", key))
    }

    pub async fn list(&self, params: &ListParams) -> DbResult<ListResult<Product>> {
        let order = build_order_clause(params, SORT_FIELDS, "product_key");
        let window = build_limit_offset_clause(params);

        let items =
            sqlx::query_as::<_, Product>(&format!("SELECT * FROM product {} {}", order, window))
                .fetch_all(self.pool)
                .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(self.pool)
            .await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, product.category_key, product.subcategory_key).await?;

        let result = sqlx::query(
            "UPDATE product SET product_name = ?, brand = ?, color = ?, unit_cost_usd = ?, \
             unit_price_usd = ?, category_key = ?, subcategory_key = ? WHERE product_key = ?",
        )
        .bind(&product.product_name)
        .bind(&product.brand)
        .bind(&product.color)
        .bind(product.unit_cost_usd)
        .bind(product.unit_price_usd)
        .bind(product.category_key)
        .bind(product.subcategory_key)
        .bind(product.product_key)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.product_key));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM product WHERE product_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", key));
        }
        Ok(())
    }
}

/// The subcategory must exist and belong to the referenced category.
async fn check_references(
    tx: &mut Transaction<'_, Sqlite>,
    category_key: i64,
    subcategory_key: i64,
) -> DbResult<()> {
    let category: Option<i64> =
        sqlx::query_scalar("SELECT category_key FROM category WHERE category_key = ?")
            .bind(category_key)
            .fetch_optional(&mut **tx)
            .await?;
    if category.is_none() {
        return Err(DbError::validation(format!(
            "category {} does not exist",
            category_key
        )));
    }

    let owner: Option<i64> =
        sqlx::query_scalar("SELECT category_key FROM subcategory WHERE subcategory_key = ?")
            .bind(subcategory_key)
            .fetch_optional(&mut **tx)
            .await?;
    match owner {
        None => Err(DbError::validation(format!(
            "subcategory {} does not exist",
            subcategory_key
        ))),
        Some(owner) if owner != category_key => Err(DbError::validation(format!(
            "subcategory {} does not belong to category {}",
            subcategory_key, category_key
        ))),
        Some(_) => Ok(()),
    }
}
