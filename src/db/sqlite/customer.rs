//! Customer repository.

use sqlx::SqlitePool;

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{Customer, DbError, DbResult, ListParams, ListResult};

const SORT_FIELDS: &[&str] = &["customer_key", "name", "city", "country", "birthday"];

pub struct CustomerRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Insert a customer, ignoring any key on the input. Returns the stored
    /// row with its generated key.
    pub async fn create(&self, customer: &Customer) -> DbResult<Customer> {
        let result = sqlx::query(
            "INSERT INTO customer (name, gender, city, state_code, state, zip_code, country, continent, birthday) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.gender)
        .bind(&customer.city)
        .bind(&customer.state_code)
        .bind(&customer.state)
        .bind(&customer.zip_code)
        .bind(&customer.country)
        .bind(&customer.continent)
        .bind(customer.birthday)
        .execute(self.pool)
        .await?;

        Ok(Customer {
            customer_key: result.last_insert_rowid(),
            ..customer.clone()
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customer WHERE customer_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", key))
    }

    pub async fn list(&self, params: &ListParams) -> DbResult<ListResult<Customer>> {
        let order = build_order_clause(params, SORT_FIELDS, "customer_key");
        let window = build_limit_offset_clause(params);

        let items = sqlx::query_as::<_, Customer>(&format!(
            "SELECT * FROM customer {} {}",
            order, window
        ))
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
            .fetch_one(self.pool)
            .await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE customer SET name = ?, gender = ?, city = ?, state_code = ?, state = ?, \
             zip_code = ?, country = ?, continent = ?, birthday = ? WHERE customer_key = ?",
        )
        .bind(&customer.name)
        .bind(&customer.gender)
        .bind(&customer.city)
        .bind(&customer.state_code)
        .bind(&customer.state)
        .bind(&customer.zip_code)
        .bind(&customer.country)
        .bind(&customer.continent)
        .bind(customer.birthday)
        .bind(customer.customer_key)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer.customer_key));
        }
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customer WHERE customer_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", key));
        }
        Ok(())
    }
}
