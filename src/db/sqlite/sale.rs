//! Sale repository.
//!
//! Each row is one line item of an order; `(order_number, line_item)` is
//! unique. Reference checks run in the insert/update transaction so a sale
//! can never point at a customer, store or product that is not there.

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{DbError, DbResult, ListParams, ListResult, Sale};

const SORT_FIELDS: &[&str] = &[
    "sale_key",
    "order_number",
    "order_date",
    "quantity",
    "customer_key",
];

pub struct SaleRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> SaleRepository<'a> {
    pub async fn create(&self, sale: &Sale) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, sale).await?;

        let result = sqlx::query(
            "INSERT INTO sale (order_number, line_item, order_date, delivery_date, customer_key, \
             store_key, product_key, quantity, currency_code) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(sale.order_number)
        .bind(sale.line_item)
        .bind(sale.order_date)
        .bind(sale.delivery_date)
        .bind(sale.customer_key)
        .bind(sale.store_key)
        .bind(sale.product_key)
        .bind(sale.quantity)
        .bind(&sale.currency_code)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::AlreadyExists { .. } => DbError::AlreadyExists {
                entity: "Sale",
                key: format!("order {} line {}", sale.order_number, sale.line_item),
            },
            other => other,
        })?;

        tx.commit().await?;

        Ok(Sale {
            sale_key: result.last_insert_rowid(),
            ..sale.clone()
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>("SELECT * FROM sale WHERE sale_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", key))
    }

    /// Windowed list, optionally restricted to one order number.
    pub async fn list(
        &self,
        params: &ListParams,
        order_number: Option<i64>,
    ) -> DbResult<ListResult<Sale>> {
        let order = build_order_clause(params, SORT_FIELDS, "sale_key");
        let window = build_limit_offset_clause(params);
        let filter = match order_number {
            Some(_) => "WHERE order_number = ?",
            None => "",
        };

        let sql = format!("SELECT * FROM sale {} {} {}", filter, order, window);
        let mut query = sqlx::query_as::<_, Sale>(&sql);
        if let Some(n) = order_number {
            query = query.bind(n);
        }
        let items = query.fetch_all(self.pool).await?;

        let count_sql = format!("SELECT COUNT(*) FROM sale {}", filter);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(n) = order_number {
            count_query = count_query.bind(n);
        }
        let total = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, sale: &Sale) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, sale).await?;

        let result = sqlx::query(
            "UPDATE sale SET order_number = ?, line_item = ?, order_date = ?, delivery_date = ?, \
             customer_key = ?, store_key = ?, product_key = ?, quantity = ?, currency_code = ? \
             WHERE sale_key = ?",
        )
        .bind(sale.order_number)
        .bind(sale.line_item)
        .bind(sale.order_date)
        .bind(sale.delivery_date)
        .bind(sale.customer_key)
        .bind(sale.store_key)
        .bind(sale.product_key)
        .bind(sale.quantity)
        .bind(&sale.currency_code)
        .bind(sale.sale_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::AlreadyExists { .. } => DbError::AlreadyExists {
                entity: "Sale",
                key: format!("order {} line {}", sale.order_number, sale.line_item),
            },
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale.sale_key));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sale WHERE sale_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", key));
        }
        Ok(())
    }
}

/// Every referenced entity must exist before the row is written.
async fn check_references(tx: &mut Transaction<'_, Sqlite>, sale: &Sale) -> DbResult<()> {
    let customer: Option<i64> =
        sqlx::query_scalar("SELECT customer_key FROM customer WHERE customer_key = ?")
            .bind(sale.customer_key)
            .fetch_optional(&mut **tx)
            .await?;
    if customer.is_none() {
        return Err(DbError::validation(format!(
            "customer {} does not exist",
            sale.customer_key
        )));
    }

    let store: Option<i64> = sqlx::query_scalar("SELECT store_key FROM store WHERE store_key = ?")
        .bind(sale.store_key)
        .fetch_optional(&mut **tx)
        .await?;
    if store.is_none() {
        return Err(DbError::validation(format!(
            "store {} does not exist",
            sale.store_key
        )));
    }

    let product: Option<i64> =
        sqlx::query_scalar("SELECT product_key FROM product WHERE product_key = ?")
            .bind(sale.product_key)
            .fetch_optional(&mut **tx)
            .await?;
    if product.is_none() {
        return Err(DbError::validation(format!(
            "product {} does not exist",
            sale.product_key
        )));
    }

    Ok(())
}
