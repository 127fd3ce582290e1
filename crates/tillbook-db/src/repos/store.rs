//! Store repository

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{DbError, DbResult, DbStore};

/// Store repository. Every query is scoped to a business.
pub struct StoreRepo {
    pool: SqlitePool,
}

impl StoreRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a store; names are unique within a business
    pub async fn create(&self, business_id: Uuid, name: &str) -> DbResult<DbStore> {
        let now = Utc::now();
        let store = sqlx::query_as::<_, DbStore>(
            r#"
            INSERT INTO stores (id, business_id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, business_id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(business_id)
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store name {} already exists", name)))?;

        Ok(store)
    }

    pub async fn find(&self, business_id: Uuid, id: Uuid) -> DbResult<Option<DbStore>> {
        let store = sqlx::query_as::<_, DbStore>(
            r#"
            SELECT id, business_id, name, created_at, updated_at
            FROM stores
            WHERE id = ? AND business_id = ?
            "#,
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Stores of a business, newest first
    pub async fn list(&self, business_id: Uuid) -> DbResult<Vec<DbStore>> {
        let stores = sqlx::query_as::<_, DbStore>(
            r#"
            SELECT id, business_id, name, created_at, updated_at
            FROM stores
            WHERE business_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    pub async fn rename(&self, business_id: Uuid, id: Uuid, name: &str) -> DbResult<DbStore> {
        let store = sqlx::query_as::<_, DbStore>(
            r#"
            UPDATE stores SET name = ?, updated_at = ?
            WHERE id = ? AND business_id = ?
            RETURNING id, business_id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, || format!("Store name {} already exists", name)))?;

        store.ok_or_else(|| DbError::NotFound(format!("Store {}", id)))
    }

    /// Delete a store. Entries still referencing it make this a `Constraint` error.
    pub async fn delete(&self, business_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ? AND business_id = ?")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from_write(e, || format!("Store {} is still referenced", id)))?;

        Ok(result.rows_affected() > 0)
    }
}
