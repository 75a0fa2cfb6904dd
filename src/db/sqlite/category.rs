//! Category and subcategory repositories.
//!
//! Subcategories always belong to a category; the schema RESTRICTs deleting
//! a category that still has subcategories.

use sqlx::SqlitePool;

use super::helpers::{build_limit_offset_clause, build_order_clause};
use crate::db::{Category, DbError, DbResult, ListParams, ListResult, Subcategory};

const CATEGORY_SORT_FIELDS: &[&str] = &["category_key", "name"];
const SUBCATEGORY_SORT_FIELDS: &[&str] = &["subcategory_key", "name"];

pub struct CategoryRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    pub async fn create(&self, category: &Category) -> DbResult<Category> {
        let result = sqlx::query("INSERT INTO category (name) VALUES (?)")
            .bind(&category.name)
            .execute(self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::AlreadyExists { .. } => DbError::AlreadyExists {
                    entity: "Category",
                    key: category.name.clone(),
                },
                other => other,
            })?;

        Ok(Category {
            category_key: result.last_insert_rowid(),
            name: category.name.clone(),
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM category WHERE category_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Category", key))
    }

    pub async fn list(&self, params: &ListParams) -> DbResult<ListResult<Category>> {
        let order = build_order_clause(params, CATEGORY_SORT_FIELDS, "category_key");
        let window = build_limit_offset_clause(params);

        let items = sqlx::query_as::<_, Category>(&format!(
            "SELECT * FROM category {} {}",
            order, window
        ))
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(self.pool)
            .await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    pub async fn update(&self, category: &Category) -> DbResult<()> {
        let result = sqlx::query("UPDATE category SET name = ? WHERE category_key = ?")
            .bind(&category.name)
            .bind(category.category_key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", category.category_key));
        }
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM category WHERE category_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", key));
        }
        Ok(())
    }
}

pub struct SubcategoryRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> SubcategoryRepository<'a> {
    /// Insert a subcategory under its category. The category must exist.
    pub async fn create(&self, subcategory: &Subcategory) -> DbResult<Subcategory> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT category_key FROM category WHERE category_key = ?")
                .bind(subcategory.category_key)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Category", subcategory.category_key));
        }

        let result = sqlx::query("INSERT INTO subcategory (name, category_key) VALUES (?, ?)")
            .bind(&subcategory.name)
            .bind(subcategory.category_key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Subcategory {
            subcategory_key: result.last_insert_rowid(),
            name: subcategory.name.clone(),
            category_key: subcategory.category_key,
        })
    }

    pub async fn get(&self, key: i64) -> DbResult<Subcategory> {
        sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategory WHERE subcategory_key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Subcategory", key))
    }

    /// List the subcategories of one category. 404s if the category is absent.
    pub async fn list_by_category(
        &self,
        category_key: i64,
        params: &ListParams,
    ) -> DbResult<ListResult<Subcategory>> {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT category_key FROM category WHERE category_key = ?")
                .bind(category_key)
                .fetch_optional(self.pool)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Category", category_key));
        }

        let order = build_order_clause(params, SUBCATEGORY_SORT_FIELDS, "subcategory_key");
        let window = build_limit_offset_clause(params);

        let items = sqlx::query_as::<_, Subcategory>(&format!(
            "SELECT * FROM subcategory WHERE category_key = ? {} {}",
            order, window
        ))
        .bind(category_key)
        .fetch_all(self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subcategory WHERE category_key = ?")
                .bind(category_key)
                .fetch_one(self.pool)
                .await?;

        Ok(ListResult {
            items,
            total: total as u64,
        })
    }

    /// Full update: rename and/or move to another (existing) category.
    pub async fn update(&self, subcategory: &Subcategory) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT category_key FROM category WHERE category_key = ?")
                .bind(subcategory.category_key)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Category", subcategory.category_key));
        }

        let result =
            sqlx::query("UPDATE subcategory SET name = ?, category_key = ? WHERE subcategory_key = ?")
                .bind(&subcategory.name)
                .bind(subcategory.category_key)
                .bind(subcategory.subcategory_key)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Subcategory",
                subcategory.subcategory_key,
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, key: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM subcategory WHERE subcategory_key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Subcategory", key));
        }
        Ok(())
    }
}
