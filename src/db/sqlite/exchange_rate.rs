//! Exchange rate repository.
//!
//! Keyed by (currency_code, date). Creating a second rate for the same pair
//! is rejected; updates go through PUT/PATCH on the composite key.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{DbError, DbResult, ExchangeRate, ListParams, ListResult};

const SORT_FIELDS: &[&str] = &["currency_code", "date", "rate"];

fn composite_key(currency: &str, date: NaiveDate) -> String {
    format!("{}@{}", currency, date)
}

pub struct ExchangeRateRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ExchangeRateRepository<'a> {
    pub async fn create(&self, rate: &ExchangeRate) -> DbResult<ExchangeRate> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<f64> = sqlx::query_scalar(
            "SELECT rate FROM exchange_rate WHERE currency_code = ? AND date = ?",
        )
        .bind(&rate.currency_code)
        .bind(rate.date)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(DbError::AlreadyExists {
                entity: "ExchangeRate",
                key: composite_key(&rate.currency_code, rate.date),
            });
        }

        sqlx::query("INSERT INTO exchange_rate (currency_code, date, rate) VALUES (?, ?, ?)")
            .bind(&rate.currency_code)
            .bind(rate.date)
            .bind(rate.rate)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rate.clone())
    }

    pub async fn get(&self, currency: &str, date: NaiveDate) -> DbResult<ExchangeRate> {
        sqlx::query_as::<_, ExchangeRate>(
            "SELECT * FROM exchange_rate WHERE currency_code = ? AND date = ?",
        )
        .bind(currency)
        .bind(date)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("ExchangeRate", composite_key(currency, date)))
    }

    /// Windowed list, optionally restricted to one currency.
    pub async fn list(
        &self,
        params: &ListParams,
        currency: Option<&str>,
    ) -> DbResult<ListResult<ExchangeRate>> {
        let order = build_order_clause(params, SORT_FIELDS, "date");
        let window = build_limit_offset_clause(params);
        let filter = match currency {
            Some(_) => "WHERE currency_code = ?",
            None => "",
        };

        let sql = format!("SELECT * FROM exchange_rate {} {} {}", filter, order, window);
        let mut query = sqlx::query_as::<_, ExchangeRate>(&sql);
        if let Some(c) = currency {
            query = query.bind(c.to_string());
        }
        let items = query.fetch_all(self.pool).await?;

        let count_sql = format!("SELECT COUNT(*) FROM exchange_rate {}", filter);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(c) = currency {
            count_query = count_query.bind(c.to_string());
        }
        let total = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, rate: &ExchangeRate) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE exchange_rate SET rate = ? WHERE currency_code = ? AND date = ?")
                .bind(rate.rate)
                .bind(&rate.currency_code)
                .bind(rate.date)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "ExchangeRate",
                composite_key(&rate.currency_code, rate.date),
            ));
        }
        Ok(())
    }

    pub async fn delete(&self, currency: &str, date: NaiveDate) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM exchange_rate WHERE currency_code = ? AND date = ?")
            .bind(currency)
            .bind(date)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "ExchangeRate",
                composite_key(currency, date),
            ));
        }
        Ok(())
    }
}
